//! Applying one mutation to every item of a collection
//!
//! Used by the `--all` variants of mutating commands. Items are handled strictly
//! one after another:
//!
//! 1. confirm this item (declining aborts the whole batch)
//! 2. mutate it (a failure is recorded and the item's poll is skipped)
//! 3. wait for completion if enabled (a failure is recorded)
//!
//! Recorded failures never stop the batch. They are reported together through
//! [`BulkOutcome::into_result`], each one keyed by its item id.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::confirm::Confirmer;
use crate::error::{BulkFailure, CoreError, Result};
use crate::interrogator::Interrogator;
use crate::poller::Poller;
use crate::request::AsyncRequest;

/// Something a bulk run can act on
pub trait BulkItem {
    fn id(&self) -> &str;

    /// Human-friendly name shown next to the id in prompts
    fn display_name(&self) -> Option<&str> {
        None
    }
}

/// The mutation applied to each item
///
/// Returns the async request tracking the change, if the API issued one.
#[async_trait]
pub trait Mutation<T: Sync>: Send + Sync {
    async fn apply(&self, item: &T) -> Result<Option<AsyncRequest>>;
}

/// Result for a single item
#[derive(Debug)]
pub struct ItemOutcome {
    pub item_id: String,
    /// Request the API issued for the mutation, if any
    pub request: Option<AsyncRequest>,
    /// True when the mutation is known to have finished: it was synchronous or
    /// it was waited for
    pub completed: bool,
    pub error: Option<CoreError>,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-item results of a bulk run, in input order
#[derive(Debug, Default)]
pub struct BulkOutcome {
    items: Vec<ItemOutcome>,
}

impl BulkOutcome {
    pub fn items(&self) -> &[ItemOutcome] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items whose mutation or wait failed
    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|o| !o.is_success())
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|o| o.is_success()).count()
    }

    /// `Ok(())` if every item succeeded, otherwise one error listing every failure
    pub fn into_result(self) -> Result<()> {
        let attempted = self.items.len();
        let failures: Vec<(String, CoreError)> = self
            .items
            .into_iter()
            .filter_map(|o| o.error.map(|e| (o.item_id, e)))
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(BulkFailure::new(attempted, failures).into())
        }
    }

    fn record_failure(&mut self, item_id: &str, request: Option<AsyncRequest>, error: CoreError) {
        self.items.push(ItemOutcome {
            item_id: item_id.to_string(),
            request,
            completed: false,
            error: Some(error),
        });
    }

    fn record_success(&mut self, item_id: &str, request: Option<AsyncRequest>, completed: bool) {
        self.items.push(ItemOutcome {
            item_id: item_id.to_string(),
            request,
            completed,
            error: None,
        });
    }
}

/// Drives a [`Mutation`] over a collection
pub struct BulkMutator<'a> {
    kind: String,
    confirmer: &'a dyn Confirmer,
    force: bool,
    poller: &'a Poller,
}

impl<'a> BulkMutator<'a> {
    /// `kind` names the items in prompts and in the "no items" error
    pub fn new(kind: impl Into<String>, confirmer: &'a dyn Confirmer, poller: &'a Poller) -> Self {
        Self {
            kind: kind.into(),
            confirmer,
            force: false,
            poller,
        }
    }

    /// Skip the confirmation prompts
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Run `mutation` on every item, waiting through `interrogator` when enabled
    ///
    /// Pass `None` for mutations the API applies synchronously.
    ///
    /// Errors out before doing anything when `items` is empty, and stops
    /// immediately when the user declines an item. Otherwise returns an outcome
    /// with exactly one entry per item.
    pub async fn run<T, M>(
        &self,
        items: &[T],
        mutation: &M,
        interrogator: Option<&dyn Interrogator>,
    ) -> Result<BulkOutcome>
    where
        T: BulkItem + Sync,
        M: Mutation<T> + ?Sized,
    {
        if items.is_empty() {
            return Err(CoreError::NoItems {
                kind: self.kind.clone(),
            });
        }

        let mut outcome = BulkOutcome {
            items: Vec::with_capacity(items.len()),
        };

        for (index, item) in items.iter().enumerate() {
            let id = item.id();
            let prompt = self.prompt(item);
            if !self.confirmer.ask(&prompt, self.force)? {
                return Err(CoreError::Declined { id: id.to_string() });
            }

            info!("[{}/{}] {} {}", index + 1, items.len(), self.kind, id);

            let request = match mutation.apply(item).await {
                Ok(request) => request,
                Err(e) => {
                    warn!("Mutation of {} {} failed: {}", self.kind, id, e);
                    outcome.record_failure(id, None, e);
                    continue;
                }
            };

            match self.wait(interrogator, id, request.as_ref()).await {
                Ok(completed) => outcome.record_success(id, request, completed),
                Err(e) => {
                    warn!("Waiting for {} {} failed: {}", self.kind, id, e);
                    outcome.record_failure(id, request, e);
                }
            }
        }

        info!(
            "Processed {} {}: {} succeeded, {} failed",
            outcome.len(),
            self.kind,
            outcome.succeeded(),
            outcome.len() - outcome.succeeded()
        );
        Ok(outcome)
    }

    async fn wait(
        &self,
        interrogator: Option<&dyn Interrogator>,
        item_id: &str,
        request: Option<&AsyncRequest>,
    ) -> Result<bool> {
        match interrogator {
            Some(interrogator) => {
                self.poller
                    .wait_for_mutation(interrogator, item_id, request)
                    .await
            }
            None => Ok(true),
        }
    }

    fn prompt<T: BulkItem>(&self, item: &T) -> String {
        match item.display_name() {
            Some(name) if !name.is_empty() => {
                format!("Delete {} {} ({})?", self.kind, item.id(), name)
            }
            _ => format!("Delete {} {}?", self.kind, item.id()),
        }
    }
}
