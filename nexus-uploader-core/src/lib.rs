#![doc = "nexus-uploader-core: reconciliation pipeline for nexus-uploader."]

//! This crate contains the logic that mirrors local M2 repositories to a
//! remote Nexus repository: scanning, filtering, version limiting, file
//! classification, existence checks and uploads. It knows nothing about
//! HTTP libraries or argument parsing; the network is reached through the
//! [`contract::Transport`] trait.
//!
//! # Usage
//! Build a [`config::SynchroniseConfig`], provide a [`contract::Transport`]
//! and call [`synchronise::synchronise`].

pub mod checker;
pub mod classify;
pub mod config;
pub mod contract;
pub mod error;
pub mod filter;
pub mod retry;
pub mod scan;
pub mod select;
pub mod synchronise;
pub mod uploader;
