//! agentmon - Agent Monitor dashboard
//!
//! Polls the chatbot logs backend and serves metrics, charts, request logs,
//! agents and prompts to the browser.

pub mod api;
pub mod config;
pub mod poller;
pub mod views;
pub mod web;

#[cfg(test)]
mod test_utils;
