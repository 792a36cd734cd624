// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Helpers that wait for observed cluster state.

use crate::conditions::{has_condition, status_phase, ConditionMatch};
use crate::constants::{status, TIMEOUT_1SEC};
use crate::error::{ResourceError, Result};
use crate::polling::{RetryTable, TimeoutSampler, TimeoutWatch};
use crate::resource::object::Resource;
use futures::TryStreamExt;
use kube::api::DynamicObject;
use kube_runtime::wait::await_condition;
use std::pin::pin;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Errors that wait loops swallow: the object may not exist yet, or the connection blipped
fn wait_retry_table() -> RetryTable {
    RetryTable::not_found().merge(RetryTable::protocol())
}

impl Resource {
    /// Wait until the object can be read from the API server
    #[instrument(skip(self), fields(resource = %self.display()))]
    pub async fn wait(&self, timeout: Duration, sleep: Duration) -> Result<()> {
        info!("Wait until {} is created", self.display());

        TimeoutSampler::new(timeout, sleep, self.get_opt_fn())
            .retry_on(wait_retry_table())
            .describe(format!("{} to be created", self.display()))
            .wait_until(Option::is_some)
            .await?;
        Ok(())
    }

    /// Wait until the API server no longer returns the object
    #[instrument(skip(self), fields(resource = %self.display()))]
    pub async fn wait_deleted(&self, timeout: Duration) -> Result<()> {
        info!("Wait until {} is deleted", self.display());

        TimeoutSampler::new(timeout, TIMEOUT_1SEC, self.get_opt_fn())
            .retry_on(RetryTable::protocol())
            .describe(format!("{} to be deleted", self.display()))
            .wait_until(Option::is_none)
            .await?;
        Ok(())
    }

    /// Poll `status.phase` until it equals `wanted`.
    ///
    /// Seeing `stop_status` (default `Failed`) first ends the wait with `TimeoutExpired`.
    #[instrument(skip(self), fields(resource = %self.display()))]
    pub async fn wait_for_status(
        &self,
        wanted: &str,
        timeout: Duration,
        stop_status: Option<&str>,
        sleep: Duration,
    ) -> Result<()> {
        let stop_status = stop_status.unwrap_or(status::FAILED);
        info!("Wait for {} status to be {}", self.display(), wanted);

        let sampler = TimeoutSampler::new(timeout, sleep, self.get_fn())
            .retry_on(wait_retry_table())
            .describe(format!("{} status {}", self.display(), wanted));
        let mut samples = pin!(sampler.samples());
        let mut current: Option<String> = None;

        loop {
            match samples.try_next().await {
                Ok(Some(obj)) => {
                    let Some(phase) = status_phase(&obj) else {
                        continue;
                    };
                    if current.as_deref() != Some(phase.as_str()) {
                        info!("Status of {} is {}", self.display(), phase);
                        current = Some(phase.clone());
                    }
                    if phase == wanted {
                        return Ok(());
                    }
                    if phase == stop_status {
                        error!(
                            "Status of {} is {}, expected {}",
                            self.display(),
                            phase,
                            wanted
                        );
                        return Err(ResourceError::timeout(format!(
                            "Status of {} is {}",
                            self.display(),
                            phase
                        )));
                    }
                }
                Ok(None) => {
                    return Err(ResourceError::timeout(format!(
                        "{} status {}",
                        self.display(),
                        wanted
                    )))
                }
                Err(err) => {
                    if let Some(phase) = &current {
                        error!(
                            "Status of {} is {}, expected {}",
                            self.display(),
                            phase,
                            wanted
                        );
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Wait for a named condition to reach `condition_status`, via a watch on the object.
    ///
    /// The object is first polled into existence; both phases share one time budget.
    /// A watch that fails with a retryable error is restarted until the budget runs out.
    #[instrument(skip(self), fields(resource = %self.display()))]
    pub async fn wait_for_condition(
        &self,
        condition: &str,
        condition_status: &str,
        timeout: Duration,
    ) -> Result<()> {
        info!(
            "Wait for {}'s '{}' condition to be '{}'",
            self.display(),
            condition,
            condition_status
        );
        let budget = TimeoutWatch::new(timeout);
        self.wait(timeout, TIMEOUT_1SEC).await?;

        let retry = wait_retry_table();
        let mut last_error: Option<ResourceError> = None;

        while !budget.is_expired() {
            let condition_type = condition.to_string();
            let wanted = condition_status.to_string();
            let reached = move |obj: Option<&DynamicObject>| {
                obj.is_some_and(|o| has_condition(o, &condition_type, &wanted))
            };

            let watched = tokio::time::timeout(
                budget.remaining_time(),
                await_condition(self.api(), self.name(), reached),
            )
            .await;
            match watched {
                Ok(Ok(_)) => return Ok(()),
                Ok(Err(err)) => {
                    let err = ResourceError::from(err);
                    if !retry.is_retryable(&err) {
                        return Err(err);
                    }
                    debug!("Watch on {} failed, restarting: {}", self.display(), err);
                    last_error = Some(err);
                    tokio::time::sleep(TIMEOUT_1SEC.min(budget.remaining_time())).await;
                }
                Err(_) => break,
            }
        }

        error!(
            "{} condition '{}' did not become '{}' within {:?}",
            self.display(),
            condition,
            condition_status,
            timeout
        );
        Err(ResourceError::TimeoutExpired {
            message: format!(
                "{} condition {} to be {} after {:?}",
                self.display(),
                condition,
                condition_status,
                timeout
            ),
            last_error: last_error.map(Box::new),
        })
    }

    /// Poll until a status condition satisfies `wanted`, including the optional
    /// message, reason and category filters used by MTV providers, plans and migrations
    #[instrument(skip(self), fields(resource = %self.display()))]
    pub async fn wait_for_conditions(
        &self,
        wanted: &ConditionMatch,
        timeout: Duration,
    ) -> Result<DynamicObject> {
        info!(
            "Wait for {} condition {} to be {}",
            self.display(),
            wanted.condition_type,
            wanted.status
        );

        TimeoutSampler::new(timeout, TIMEOUT_1SEC, self.get_fn())
            .retry_on(RetryTable::not_found())
            .describe(format!(
                "{} condition {} {}",
                self.display(),
                wanted.condition_type,
                wanted.status
            ))
            .wait_until(|obj| wanted.matches_object(obj))
            .await
    }
}
