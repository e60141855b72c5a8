//! Durable, publicly addressable storage for lecture image attachments.
//!
//! [`storage::ImageStore`] writes each image to an S3-compatible bucket under
//! a fresh `attachments/<uuid>` key and returns the object's public URL.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod storage;
