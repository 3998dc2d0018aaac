/// UI module exports

pub mod card;
pub mod components;
pub mod viewer;
