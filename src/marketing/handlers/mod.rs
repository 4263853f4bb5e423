// Marketing handlers, one file per surface

pub mod analytics;
pub mod contact;
pub mod content;
pub mod waitlist;
