//! Per-user resource routes, served behind the access-control guard.

pub mod handlers;
