pub mod policy;

pub use policy::{
    FollowSuitRandomPolicy, HighestRankPolicy, Policy, PolicyContext, PolicyKind,
    UniformRandomPolicy,
};
