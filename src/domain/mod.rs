//! Domain model: entities, value objects, the pure reconciliation and
//! allocation rules, and the ports the application layer depends on.

pub mod allocation;
pub mod audit;
pub mod group;
pub mod member;
pub mod money;
pub mod payment;
pub mod period;
pub mod ports;
pub mod reconcile;
