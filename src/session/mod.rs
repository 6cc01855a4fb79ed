// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session layer: the client façade, request dispatch over the two
//! transports, redirect following and the receive hook.

mod client;
mod dispatch;
mod hook;
mod redirect;

#[cfg(test)]
pub(crate) mod echo;

pub use client::SessionClient;
pub use dispatch::{RequestDispatcher, VirtualRequest, VirtualResponse, VirtualServer};
pub use hook::{FollowAlways, ReceiveHook};
pub use redirect::RedirectEngine;
