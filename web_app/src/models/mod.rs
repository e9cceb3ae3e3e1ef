pub mod claims;
pub mod contact;
pub mod guest;
pub mod label;
pub mod waitlist;
