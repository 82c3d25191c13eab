//! Individual pipeline steps, shared by the server/standalone tick and the
//! two-phase client tick.

use crate::config::PipelineConfig;
use crate::diagnostics;
use crate::dispatch::TypeDispatchTable;
use crate::error::ObjectError;
use crate::object::{ObjectFlags, ObjectKind};
use crate::pool::{DeleteOutcome, ObjectPool};

use super::Collaborators;

/// Which objects the move pass visits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MoveFilter {
    /// Every live object.
    All,
    /// Client prediction: the local player's ship and every non-ship.
    Predicted,
}

/// Deletes every object marked should-be-dead and clears each object's
/// dock guard for the coming tick.
pub(crate) fn reap(pool: &mut ObjectPool, dispatch: &mut TypeDispatchTable) -> usize {
    let mut reaped = 0;
    pool.for_each_used(|pool, slot| {
        let Some(record) = pool.get_mut(slot) else {
            return;
        };
        // Dock propagation relies on this reset happening once per tick.
        record.flags.remove(ObjectFlags::DOCKED_ALREADY_HANDLED);
        if !record.should_be_dead() {
            return;
        }

        match pool.delete(slot, dispatch) {
            Ok(DeleteOutcome::Freed) => reaped += 1,
            Ok(_) => {}
            Err(err) => tracing::error!(slot, error = %err, "failed to reap object"),
        }
    });
    reaped
}

/// Runs pre-move, physics and post-move for one object.
///
/// # Returns
///
/// `None` if the object was skipped, otherwise whether it emits an active
/// countermeasure this tick.
pub(crate) fn move_object(
    pool: &mut ObjectPool,
    slot: usize,
    dt: f32,
    filter: MoveFilter,
    config: &PipelineConfig,
    collab: &mut Collaborators<'_>,
) -> Option<bool> {
    let policy = pool.invariant_policy();
    let player = pool.player_slot();
    let record = pool.get_mut(slot)?;

    if record.kind == ObjectKind::None {
        let _ = diagnostics::report(policy, ObjectError::DispatchOnFreeSlot { slot });
        return None;
    }
    if record.should_be_dead() || record.kind == ObjectKind::Observer {
        return None;
    }
    if filter == MoveFilter::Predicted && record.kind == ObjectKind::Ship && player != Some(slot) {
        return None;
    }

    record.last_position = record.position;
    record.last_orientation = record.orientation;

    if let Err(err) = collab.dispatch.pre_move(pool, slot, dt) {
        let _ = diagnostics::report(policy, err);
        return None;
    }
    fire_listeners(pool, slot, Phase::Pre);

    let record = pool.get_mut(slot)?;
    let frozen = record.has_flag(ObjectFlags::IMMOBILE) && record.hull_strength > 0.0;
    if !frozen && !config.physics_paused {
        if collab.network.is_interpolated(record) {
            collab.network.interpolate(record, dt);
        } else {
            collab.physics.integrate(
                &mut record.position,
                &mut record.orientation,
                &mut record.physics,
                dt,
            );
        }
        if config.planar {
            record.position.y = 0.0;
            record.physics.velocity.y = 0.0;
        }
    }

    if let Err(err) = collab.dispatch.post_move(pool, slot, dt) {
        let _ = diagnostics::report(policy, err);
        return Some(false);
    }
    fire_listeners(pool, slot, Phase::Post);

    let record = pool.get(slot)?;
    let countermeasure = record.kind == ObjectKind::Weapon
        && !record.should_be_dead()
        && collab.dispatch.countermeasure_pulse(record).unwrap_or(false);
    Some(countermeasure)
}

#[derive(Clone, Copy)]
enum Phase {
    Pre,
    Post,
}

/// Fires an object's listeners with the list detached from the record,
/// which they only see by shared reference.
fn fire_listeners(pool: &mut ObjectPool, slot: usize, phase: Phase) {
    let Some(record) = pool.get_mut(slot) else {
        return;
    };
    let mut event = match phase {
        Phase::Pre => std::mem::take(&mut record.pre_move_event),
        Phase::Post => std::mem::take(&mut record.post_move_event),
    };
    if event.is_empty() {
        return;
    }

    event.fire(record);

    match phase {
        Phase::Pre => record.pre_move_event = event,
        Phase::Post => record.post_move_event = event,
    }
}
