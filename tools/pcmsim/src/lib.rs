//! pcmsim - card image tool and host simulator for the PWM player
//!
//! This library exposes the internal modules for testing purposes.

pub mod card;
pub mod pack;
pub mod sim;
