// HTTP surface — request routing and serving-loop supervision.

pub mod handler;
pub mod supervisor;
