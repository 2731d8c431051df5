pub mod compile;
pub mod dispatch;
pub mod latest;
pub mod normalize;
pub mod predicate;
