//! Результат тика узла behavior tree

use bevy::prelude::*;

/// Status узла после одного тика.
///
/// Running нет: каждый тик task либо сделал свой шаг (Success),
/// либо не может действовать (Failure). Многотиковые действия
/// (подход к цели, патруль) просто повторяются на следующем FixedUpdate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum Status {
    Success,
    Failure,
}

impl Status {
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failure)
    }

    /// Success ↔ Failure (для `not` узла)
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
        }
    }

    /// bool → Status (удобно для condition-тасков)
    #[inline]
    pub fn from_bool(ok: bool) -> Self {
        if ok {
            Status::Success
        } else {
            Status::Failure
        }
    }
}
