//! Points in two dimensions.

use crate::core::float::Float;

pub type Point2f = Point2<Float>;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point2<T> {
    pub x: T,
    pub y: T,
}

impl<T> Point2<T> {
    pub fn new(x: T, y: T) -> Self {
        Point2 { x, y }
    }
}
