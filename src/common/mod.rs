/*!
Small helpers shared between the transport, codec, and notify/search builders.
Kept separate from `ssdp` because none of it is SSDP-specific.
*/

pub mod interface;

pub mod user_agent;
