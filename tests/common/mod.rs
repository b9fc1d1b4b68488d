#![allow(dead_code)] // Each test binary uses a different subset

pub mod fakes;
pub mod helpers;
