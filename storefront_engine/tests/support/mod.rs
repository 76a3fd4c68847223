#![allow(dead_code)]

pub mod prepare_env;
