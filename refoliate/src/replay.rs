//! Ordered replay of the hierarchy against FOLIO
//!
//! Walks the tree depth-first, instance before its holdings before their
//! items, because the storage modules enforce referential integrity: a
//! child whose parent does not exist yet is refused. Each node gets an
//! existence check first, so re-running a restore is an idempotent no-op
//! for everything already present.

use crate::error::Result;
use crate::folio::{CreateOutcome, RecordStore};
use crate::hierarchy::InstanceNode;
use crate::records::{RawRecord, RecordKind};

/// Per-run counters reported when the walk finishes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Records created in FOLIO
    pub created: usize,
    /// Records that already existed and were left alone
    pub skipped: usize,
    /// Records FOLIO refused (validation failures, id mismatches)
    pub rejected: usize,
}

impl RestoreSummary {
    /// True when no record was rejected
    pub fn is_clean(&self) -> bool {
        self.rejected == 0
    }
}

/// Whether the walk continues after a node is processed
enum Flow {
    Continue,
    Stop,
}

/// Recreate every node of the tree in parent-before-child order
///
/// `stop_on_error` governs only recoverable failures (rejected creates):
/// when set, the first rejection ends the walk; when clear, rejections are
/// logged and counted while the walk continues, descending even into a
/// rejected node's children since each child gets its own existence check.
/// Server-side (5xx) and transport failures always abort via `Err`.
pub async fn restore<S: RecordStore + ?Sized>(
    store: &S,
    roots: &[InstanceNode],
    stop_on_error: bool,
) -> Result<RestoreSummary> {
    let mut summary = RestoreSummary::default();

    'walk: for instance in roots {
        let flow = visit(
            store,
            RecordKind::Instance,
            &instance.id,
            &instance.record,
            stop_on_error,
            &mut summary,
        )
        .await?;
        if matches!(flow, Flow::Stop) {
            break 'walk;
        }

        for holdings in &instance.holdings {
            let flow = visit(
                store,
                RecordKind::Holdings,
                &holdings.id,
                &holdings.record,
                stop_on_error,
                &mut summary,
            )
            .await?;
            if matches!(flow, Flow::Stop) {
                break 'walk;
            }

            for item in &holdings.items {
                let flow = visit(
                    store,
                    RecordKind::Item,
                    &item.id,
                    &item.record,
                    stop_on_error,
                    &mut summary,
                )
                .await?;
                if matches!(flow, Flow::Stop) {
                    break 'walk;
                }
            }
        }
    }

    tracing::info!(
        created = summary.created,
        skipped = summary.skipped,
        rejected = summary.rejected,
        "replay finished"
    );

    Ok(summary)
}

async fn visit<S: RecordStore + ?Sized>(
    store: &S,
    kind: RecordKind,
    id: &str,
    record: &RawRecord,
    stop_on_error: bool,
    summary: &mut RestoreSummary,
) -> Result<Flow> {
    if store.exists(kind, id).await? {
        tracing::warn!(%kind, id = %id, "record already exists in FOLIO, not recreating");
        summary.skipped += 1;
        return Ok(Flow::Continue);
    }

    match store.create(kind, record).await? {
        CreateOutcome::Created { id: returned } if returned == id => {
            tracing::info!(%kind, id = %id, "created record");
            summary.created += 1;
            Ok(Flow::Continue)
        }
        CreateOutcome::Created { id: returned } => {
            // FOLIO is expected to preserve caller-supplied UUIDs; a
            // different id back means the record did not land where its
            // children will look for it.
            tracing::warn!(
                %kind,
                id = %id,
                returned = %returned,
                "FOLIO assigned a different id than requested"
            );
            summary.rejected += 1;
            Ok(if stop_on_error { Flow::Stop } else { Flow::Continue })
        }
        CreateOutcome::Rejected { messages } => {
            tracing::warn!(
                %kind,
                id = %id,
                reasons = %messages.join("; "),
                "FOLIO rejected record"
            );
            summary.rejected += 1;
            Ok(if stop_on_error { Flow::Stop } else { Flow::Continue })
        }
    }
}
