// src/system/mod.rs

pub mod storage;
