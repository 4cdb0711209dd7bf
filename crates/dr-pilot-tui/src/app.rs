//! Application loop
//!
//! Owns the single manage-policies view and routes terminal events, ticks,
//! and follow-up actions through it. Cluster I/O happens between loop turns;
//! the draw itself never blocks.

use crate::action::Action;
use crate::audit::init_audit;
use crate::components::{Component, PoliciesComponent};
use crate::tui::Tui;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use dr_pilot_core::constants::refresh_intervals;
use dr_pilot_core::describe_ramen_error;
use ramen_rs::RamenClient;
use std::time::Duration;

pub struct App {
    policies: PoliciesComponent,
    /// Kubeconfig context to connect with; current context when absent
    context: Option<String>,
    /// Namespace scope for placement controls; all namespaces when absent
    namespace: Option<String>,
    /// How long one event poll waits before emitting a tick
    tick: Duration,
    refresh_interval: Duration,
    running: bool,
}

impl App {
    pub fn new(
        context: Option<String>,
        namespace: Option<String>,
        page_size: usize,
        refresh_secs: u64,
    ) -> Self {
        let refresh_secs = if refresh_secs == 0 {
            refresh_intervals::POLICIES
        } else {
            refresh_secs
        };
        Self {
            policies: PoliciesComponent::new(page_size),
            context,
            namespace,
            tick: Duration::from_millis(100),
            refresh_interval: Duration::from_secs(refresh_secs),
            running: true,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::enter()?;
        self.connect().await?;

        while self.running {
            tui.draw(|frame| {
                let area = frame.area();
                let _ = self.policies.draw(frame, area);
            })?;

            if event::poll(self.tick)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if let Some(action) = self.policies.handle_key_event(key)? {
                            self.apply(action).await?;
                        }
                    }
                    Event::Resize(w, h) => self.apply(Action::Resize(w, h)).await?,
                    _ => {}
                }
            } else {
                self.apply(Action::Tick).await?;
            }

            if self.policies.should_refresh(self.refresh_interval) {
                self.policies.refresh().await?;
            }
        }

        Ok(())
    }

    /// Connect to the cluster and prime the policy list
    async fn connect(&mut self) -> Result<()> {
        init_audit(self.context.as_deref().unwrap_or("current-context"));

        let connected = match &self.context {
            Some(ctx) => RamenClient::from_context(ctx).await,
            None => RamenClient::connect().await,
        };
        match connected {
            Ok(client) => {
                let client = match &self.namespace {
                    Some(ns) => client.with_namespace(ns),
                    None => client,
                };
                tracing::info!("connected to cluster");
                self.policies.set_client(client);
                self.policies.refresh().await?;
            }
            Err(e) => {
                tracing::error!("connection failed: {}", e);
                self.policies.set_error(describe_ramen_error(&e));
            }
        }
        Ok(())
    }

    /// Route an action and whatever follow-ups it produces
    async fn apply(&mut self, action: Action) -> Result<()> {
        let mut next = Some(action);
        while let Some(action) = next.take() {
            match action {
                Action::Quit => self.running = false,
                Action::Refresh => self.policies.refresh().await?,
                // Redrawn at the new size on the next loop turn
                Action::Resize(_, _) => {}
                Action::Tick => next = self.policies.update(Action::Tick)?,
            }
        }
        Ok(())
    }
}
