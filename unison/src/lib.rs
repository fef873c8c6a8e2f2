#![doc = include_str!("lib_readme.md")]
#![allow(clippy::bool_assert_comparison)]
#![allow(clippy::bool_comparison)]
#![deny(unused_qualifications)]

macro_rules! func_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let n = &name[..name.len() - 3];
        let nn = n.replace("::{{closure}}", "");
        nn
    }};
}

mod base;
mod config;
mod core;

pub mod elect;
pub mod errors;
pub mod membership;
pub mod metrics;
pub mod service;
pub mod testing;
pub mod unison;

pub use anyerror;
pub use anyerror::AnyError;
pub use async_trait::async_trait;

pub use crate::config::Config;
pub use crate::config::ConfigError;
pub use crate::elect::Preference;
pub use crate::membership::Node;
pub use crate::membership::NodeId;
pub use crate::membership::View;
pub use crate::metrics::Metrics;
pub use crate::metrics::NodeState;
pub use crate::service::Service;
pub use crate::unison::Unison;
