//! Per-record step bookkeeping shared by every wizard-style screen.
//!
//! Several pages of a documentation flow repeat the same pattern: walk a fixed
//! number of sub-steps for record 0, then record 1, and so on, handing control
//! back to the page router once the last record is done. `Wizard` owns that
//! `(sub-step, record index)` cursor and persists it in the session `Context`,
//! so each screen only supplies its form types, its validation, and the
//! side-effect applied when a record finishes.

use serde::{Deserialize, Serialize};

use crate::context::Context;

/// Position inside a wizard page: 1-based sub-step, 0-based record index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardCursor {
    pub step: usize,
    pub record: usize,
}

impl WizardCursor {
    pub fn first() -> Self {
        Self { step: 1, record: 0 }
    }
}

impl Default for WizardCursor {
    fn default() -> Self {
        Self::first()
    }
}

/// Result of advancing past the current sub-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the given sub-step of the same record.
    Step(usize),
    /// The current record is done; moved to sub-step 1 of the given record.
    NextRecord(usize),
    /// Every record has completed all sub-steps.
    Finished,
}

/// Result of stepping backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retreat {
    /// Moved back to the given sub-step of the same record.
    Step(usize),
    /// Already on sub-step 1: the page should hand control back to the router.
    Exit,
}

/// Cursor manager for one wizard page.
#[derive(Debug, Clone)]
pub struct Wizard {
    page: String,
    steps: usize,
}

impl Wizard {
    /// `steps` is the number of sub-steps each record goes through (>= 1).
    pub fn new(page: impl Into<String>, steps: usize) -> Self {
        debug_assert!(steps >= 1);
        Self {
            page: page.into(),
            steps,
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    fn key(&self) -> String {
        format!("{}.cursor", self.page)
    }

    /// Current cursor for this page, starting fresh if none is stored.
    pub async fn cursor(&self, context: &Context) -> WizardCursor {
        context.get(&self.key()).await.unwrap_or_default()
    }

    /// Advance past the cursor's current sub-step and persist the new
    /// position. `record_count` is the current number of records; when the
    /// last record finishes the cursor is cleared so a revisit starts fresh.
    pub async fn advance(&self, context: &Context, record_count: usize) -> Advance {
        let mut cursor = self.cursor(context).await;

        if cursor.step < self.steps {
            cursor.step += 1;
            context.set(self.key(), cursor).await;
            return Advance::Step(cursor.step);
        }

        if cursor.record + 1 < record_count {
            cursor.record += 1;
            cursor.step = 1;
            context.set(self.key(), cursor).await;
            return Advance::NextRecord(cursor.record);
        }

        context.remove(&self.key()).await;
        Advance::Finished
    }

    /// Step backwards within the current record. The cursor never goes below
    /// sub-step 1; on sub-step 1 the stored cursor is left untouched and
    /// `Exit` is returned.
    pub async fn retreat(&self, context: &Context) -> Retreat {
        let mut cursor = self.cursor(context).await;

        if cursor.step > 1 {
            cursor.step -= 1;
            context.set(self.key(), cursor).await;
            return Retreat::Step(cursor.step);
        }

        Retreat::Exit
    }

    /// Drop any stored cursor for this page.
    pub async fn reset(&self, context: &Context) {
        context.remove(&self.key()).await;
    }
}
