//! The command abstraction and the apply state machine.
//!
//! A command renders one logical change twice: as a [`Batch`] for a live
//! server and as a [`Transform`] for a configuration file. Both renderings
//! are pure functions of the command and a [`ManagementVersion`]; all I/O
//! happens in [`apply`].

use crate::context::{OfflineContext, OnlineContext, Target};
use crate::error::{Error, ErrorCategory, Result};
use model::{Address, ManagementVersion};
use offline::Transform;
use online::Batch;
use std::fmt;

/// A configuration change that can be applied to either backend.
pub trait Command {
    /// Short description, e.g. `add data source 'DS1'`.
    fn describe(&self) -> String;

    /// Steps to submit to a live server.
    fn render_batch(&self, version: ManagementVersion) -> Batch;

    /// Mutation to apply to a configuration file.
    fn render_transform(&self, version: ManagementVersion) -> Transform;

    /// Read-only checks against a live server before anything changes.
    fn check_online(&self, _ctx: &OnlineContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Change a live server. Runs only after [`check_online`](Self::check_online)
    /// passed.
    fn mutate_online(&self, ctx: &OnlineContext<'_>) -> Result<()> {
        submit(ctx, &self.describe(), &self.render_batch(ctx.version()))
    }

    /// Apply to a live server.
    fn apply_online(&self, ctx: &OnlineContext<'_>) -> Result<()>
    where
        Self: Sized,
    {
        apply(self, Target::Online(ctx))
    }

    /// Apply to a configuration file.
    fn apply_offline(&self, ctx: &OfflineContext) -> Result<()>
    where
        Self: Sized,
    {
        apply(self, Target::Offline(ctx))
    }
}

/// Progress of one [`apply`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyState {
    /// Nothing done yet.
    Unapplied,
    /// Checking preconditions; nothing has changed.
    Validating,
    /// A precondition failed; nothing has changed.
    PreconditionFailed,
    /// Changing the target.
    Mutating,
    /// The change took effect.
    Applied,
    /// The change could not be made; no partial effect remains.
    MutationFailed,
}

impl ApplyState {
    /// Whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::PreconditionFailed | Self::Applied | Self::MutationFailed
        )
    }

    /// Terminal state after `err`. Only a business-rule failure raised before
    /// mutating counts as a failed precondition.
    fn failed_with(self, err: &Error) -> Self {
        if self == Self::Validating && err.category() == ErrorCategory::Precondition {
            Self::PreconditionFailed
        } else {
            Self::MutationFailed
        }
    }

    fn advance(&mut self, next: Self, command: &str) {
        log::debug!("{command}: {self} -> {next}");
        *self = next;
    }
}

impl fmt::Display for ApplyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unapplied => "unapplied",
            Self::Validating => "validating",
            Self::PreconditionFailed => "precondition-failed",
            Self::Mutating => "mutating",
            Self::Applied => "applied",
            Self::MutationFailed => "mutation-failed",
        };
        write!(f, "{name}")
    }
}

/// Apply a command to a target.
///
/// Online, the command's read-only checks run first and its mutation only
/// when they pass. Offline, the transform runs on an in-memory copy of the
/// document, and the file is written only when the script succeeded.
pub fn apply(command: &dyn Command, target: Target<'_>) -> Result<()> {
    let name = command.describe();
    let mut state = ApplyState::Unapplied;
    state.advance(ApplyState::Validating, &name);

    let outcome = match target {
        Target::Online(ctx) => apply_online(command, ctx, &mut state, &name),
        Target::Offline(ctx) => apply_offline(command, ctx, &mut state, &name),
    };

    match outcome {
        Ok(()) => {
            state.advance(ApplyState::Applied, &name);
            log::info!("{name} applied to {}", target.describe());
            Ok(())
        }
        Err(err) => {
            state.advance(state.failed_with(&err), &name);
            Err(err)
        }
    }
}

fn apply_online(
    command: &dyn Command,
    ctx: &OnlineContext<'_>,
    state: &mut ApplyState,
    name: &str,
) -> Result<()> {
    command.check_online(ctx)?;
    state.advance(ApplyState::Mutating, name);
    command.mutate_online(ctx)
}

fn apply_offline(
    command: &dyn Command,
    ctx: &OfflineContext,
    state: &mut ApplyState,
    name: &str,
) -> Result<()> {
    let transform = command.render_transform(ctx.version());
    let mut document = ctx.file().load()?;
    if let Err(err) = document.apply(&transform) {
        return Err(Error::from(err));
    }
    state.advance(ApplyState::Mutating, name);
    ctx.file().save(&document)?;
    Ok(())
}

/// Submit a rendered batch, wrapping a failed outcome as a command failure.
pub(crate) fn submit(ctx: &OnlineContext<'_>, command: &str, batch: &Batch) -> Result<()> {
    ctx.operations()
        .batch(batch)
        .map_err(|err| Error::from_batch(command, err))?;
    Ok(())
}

/// Fail with `<what> already exists` if `address` exists on the server.
pub(crate) fn ensure_absent(ctx: &OnlineContext<'_>, address: &Address, what: &str) -> Result<()> {
    if ctx.operations().exists(address)? {
        return Err(Error::failed(crate::error::already_exists(what)));
    }
    Ok(())
}

/// Fail with `<what> does not exist` unless `address` exists on the server.
pub(crate) fn ensure_present(ctx: &OnlineContext<'_>, address: &Address, what: &str) -> Result<()> {
    if !ctx.operations().exists(address)? {
        return Err(Error::failed(crate::error::does_not_exist(what)));
    }
    Ok(())
}

/// Remove `address` ahead of re-creating it.
///
/// This is a separate round trip from the batch that follows, so the
/// resource is briefly absent. A failed removal stops the command.
pub(crate) fn remove_for_replace(ctx: &OnlineContext<'_>, address: &Address) -> Result<()> {
    if ctx.operations().remove_if_exists(address)? {
        log::info!("removed existing {address} before re-creating it");
    }
    Ok(())
}
