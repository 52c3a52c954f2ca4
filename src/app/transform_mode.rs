use std::fmt;

/// Which manipulation the transform gizmo performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransformMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl TransformMode {
    /// Cycle order of [`TransformModeController::advance`].
    pub const ALL: [TransformMode; 3] = [Self::Translate, Self::Rotate, Self::Scale];

    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Translate => Self::Rotate,
            Self::Rotate => Self::Scale,
            Self::Scale => Self::Translate,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
        }
    }
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-state cycle over [`TransformMode`]. It has no terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformModeController {
    mode: TransformMode,
}

impl TransformModeController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    /// Moves to the next mode, wrapping from scale to translate.
    pub fn advance(&mut self) -> TransformMode {
        self.mode = self.mode.next();
        log::debug!("Transform mode: {}", self.mode);
        self.mode
    }
}
