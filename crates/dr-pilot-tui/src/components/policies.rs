//! Manage-policies component
//!
//! Lists the DR policies protecting the application scope with search and
//! pagination, supports multi-select, and drives the confirm -> unassign ->
//! result overlay flow. All modal state lives in an owned `ModalState`
//! mutated through reducer dispatches; the unassign run executes on a
//! background task and its result is folded back in only once every request
//! has settled.

use crate::action::Action;
use crate::audit::{AuditEvent, record};
use crate::components::Component;
use chrono::Utc;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use dr_pilot_core::constants::{DEFAULT_PAGE_SIZE, INITIAL_PAGE, RAMEN_CRDS};
use dr_pilot_core::{
    ActionContext, DataPolicy, ErrorKind, FetchState, MessageVariant, ModalAction, ModalState,
    PageView, PolicyStore, ReplicationHealth, UnassignOutcome, apply_unassign_outcome,
    begin_unassign, confirm_message, describe_ramen_error, filter_policies, placement_refs, reduce,
    unassign_policies,
};
use ramen_rs::{RamenClient, RamenError};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};
use tokio::task::JoinHandle;

/// Manage-policies view
pub struct PoliciesComponent {
    /// Ramen client, set once connected
    client: Option<RamenClient>,

    /// Loaded policy collection
    state: FetchState<PolicyStore>,

    /// Modal flow state: selection, overlay phase, message, pending guard
    modal: ModalState,

    /// Search text; filters by case-insensitive name substring
    search: String,
    /// True while keystrokes go to the search field
    search_active: bool,

    /// Current 1-based page; deliberately not reset on search changes
    page: usize,
    page_size: usize,

    /// Focused row within the current page
    cursor: usize,

    /// Outstanding unassign run
    unassign_task: Option<JoinHandle<UnassignOutcome>>,
    /// Names audited for the outstanding run
    pending_names: String,
}

impl PoliciesComponent {
    pub fn new(page_size: usize) -> Self {
        Self {
            client: None,
            state: FetchState::new(),
            modal: ModalState::new(),
            search: String::new(),
            search_active: false,
            page: INITIAL_PAGE,
            page_size: if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size },
            cursor: 0,
            unassign_task: None,
            pending_names: String::new(),
        }
    }

    pub fn set_client(&mut self, client: RamenClient) {
        self.client = Some(client);
    }

    pub fn set_error(&mut self, error: String) {
        self.state.fail(error);
    }

    /// Whether the periodic refresh should run now
    ///
    /// Suppressed while an unassign run is outstanding so a reload cannot
    /// disturb the selection before the run settles.
    pub fn should_refresh(&self, interval: std::time::Duration) -> bool {
        self.unassign_task.is_none() && self.state.due_for_refresh(interval)
    }

    fn view(&self) -> Option<PageView<'_>> {
        self.state
            .data()
            .map(|store| store.view(&self.search, self.page, self.page_size))
    }

    /// Reload the policy collection and re-establish the selection invariant
    pub async fn refresh(&mut self) -> Result<()> {
        let Some(client) = self.client.clone() else {
            return Ok(());
        };
        self.state.begin_fetch();

        match Self::fetch(&client).await {
            Ok(policies) => {
                self.modal.selection.retain_known(&policies);
                self.state.complete(PolicyStore::new(policies));
                self.clamp_cursor();
            }
            Err(e) => {
                tracing::warn!("policy refresh failed: {}", e);
                let formatted = describe_ramen_error(&e);
                let message = match ErrorKind::of(&e) {
                    ErrorKind::Missing => format!(
                        "{} - are the Ramen CRDs installed? ({})",
                        formatted,
                        RAMEN_CRDS.join(", ")
                    ),
                    kind => format!("{}: {}", kind.label(), formatted),
                };
                self.state.fail(message);
            }
        }
        Ok(())
    }

    async fn fetch(client: &RamenClient) -> Result<Vec<DataPolicy>, RamenError> {
        let policies = client.list_policies().await?;
        let controls = client.list_placement_controls().await?;
        Ok(DataPolicy::project(&policies, &controls, Utc::now()))
    }

    fn clamp_cursor(&mut self) {
        let rows = self.view().map(|v| v.rows.len()).unwrap_or(0);
        if rows == 0 {
            self.cursor = 0;
        } else if self.cursor >= rows {
            self.cursor = rows - 1;
        }
    }

    fn focused_policy(&self) -> Option<DataPolicy> {
        self.view()
            .and_then(|v| v.rows.get(self.cursor).map(|p| (*p).clone()))
    }

    fn toggle_focused(&mut self) {
        if let Some(policy) = self.focused_policy() {
            self.modal.selection.toggle(&policy);
        }
    }

    fn select_all_filtered(&mut self) {
        let all: Vec<DataPolicy> = self
            .state
            .data()
            .map(|store| {
                filter_policies(store.policies(), &self.search)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        reduce(&mut self.modal, ModalAction::SelectPolicies(all));
    }

    fn next_page(&mut self) {
        let pages = self
            .view()
            .map(|v| v.page_count)
            .unwrap_or(0)
            .max(INITIAL_PAGE);
        if self.page < pages {
            self.page += 1;
            self.cursor = 0;
        }
    }

    fn prev_page(&mut self) {
        if self.page > INITIAL_PAGE {
            self.page -= 1;
            self.cursor = 0;
        }
    }

    /// Open the confirm overlay: the pending-action message is set before
    /// the context transition, as the reducer expects of its caller
    fn open_confirm(&mut self) {
        if self.modal.selection.is_empty() || self.modal.unassign_pending {
            return;
        }
        let count = self.modal.selection.len();
        reduce(&mut self.modal, ModalAction::SetMessage(confirm_message(count)));
        reduce(
            &mut self.modal,
            ModalAction::SetActionContext(Some(ActionContext::ConfirmingUnassign)),
        );
    }

    fn close_overlay(&mut self) {
        reduce(&mut self.modal, ModalAction::Cancel);
        reduce(&mut self.modal, ModalAction::ClearMessage);
    }

    /// Spawn the unassign run for the current selection
    ///
    /// The run owns a snapshot of the selection; the UI stays responsive and
    /// the result is only folded in once every request has settled.
    fn start_unassign(&mut self) {
        if !begin_unassign(&mut self.modal) {
            return;
        }
        let Some(client) = self.client.clone() else {
            apply_unassign_outcome(
                &mut self.modal,
                &UnassignOutcome::Failure {
                    reason: "Not connected to a cluster".to_string(),
                },
            );
            return;
        };

        let selected = self.modal.selection.policies().to_vec();
        self.pending_names = selected
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(",");
        record(AuditEvent::RunStarted {
            policies: self.pending_names.clone(),
            controls: placement_refs(&selected).len(),
        });

        self.unassign_task = Some(tokio::spawn(async move {
            unassign_policies(&selected, move |target| {
                let client = client.clone();
                async move {
                    client
                        .unassign(&target.namespace, &target.name, &target.placement)
                        .await
                }
            })
            .await
        }));
    }

    /// Fold a settled unassign run back into the modal state
    ///
    /// Returns a refresh action after a success so the list reflects the
    /// deletions.
    fn poll_unassign(&mut self) -> Option<Action> {
        let finished = self
            .unassign_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if !finished {
            return None;
        }
        let task = self.unassign_task.take()?;

        let outcome = match futures::executor::block_on(task) {
            Ok(outcome) => outcome,
            Err(e) => UnassignOutcome::Failure {
                reason: format!("Unassign task failed: {}", e),
            },
        };

        match &outcome {
            UnassignOutcome::Success { count } => {
                record(AuditEvent::RunSucceeded {
                    policies: std::mem::take(&mut self.pending_names),
                    count: *count,
                });
            }
            UnassignOutcome::Failure { reason } => {
                record(AuditEvent::RunFailed {
                    policies: std::mem::take(&mut self.pending_names),
                    reason: reason.clone(),
                });
            }
        }
        apply_unassign_outcome(&mut self.modal, &outcome);

        matches!(outcome, UnassignOutcome::Success { .. }).then_some(Action::Refresh)
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.search_active = false;
            }
            KeyCode::Backspace => {
                self.search.pop();
                self.clamp_cursor();
            }
            KeyCode::Char(c) => {
                self.search.push(c);
                self.clamp_cursor();
            }
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('/') => {
                self.search_active = true;
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let rows = self.view().map(|v| v.rows.len()).unwrap_or(0);
                if rows > 0 && self.cursor + 1 < rows {
                    self.cursor += 1;
                }
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Right | KeyCode::Char('n') => {
                self.next_page();
                None
            }
            KeyCode::Left | KeyCode::Char('p') => {
                self.prev_page();
                None
            }
            KeyCode::Char('g') => {
                self.page = INITIAL_PAGE;
                self.cursor = 0;
                None
            }
            KeyCode::Char(' ') => {
                self.toggle_focused();
                None
            }
            KeyCode::Char('a') => {
                self.select_all_filtered();
                None
            }
            KeyCode::Char('c') => {
                reduce(&mut self.modal, ModalAction::SelectPolicies(Vec::new()));
                None
            }
            KeyCode::Char('u') => {
                self.open_confirm();
                None
            }
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        }
    }

    // ---- drawing ----------------------------------------------------------

    fn draw_main(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(area);

        self.draw_header(frame, chunks[0]);
        self.draw_toolbar(frame, chunks[1]);
        self.draw_table(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let total = self.state.data().map(|s| s.len()).unwrap_or(0);
        let lagging = self
            .state
            .data()
            .map(|s| {
                s.policies()
                    .iter()
                    .filter(|p| p.sync_health.needs_attention())
                    .count()
            })
            .unwrap_or(0);
        let assign_hint = if self.modal.selection.is_empty() {
            Span::styled(" [assign via console] ", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(
                " assign disabled while policies are selected ",
                Style::default().fg(Color::DarkGray),
            )
        };
        let mut header = vec![
            Span::styled(
                " My policies ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("({} assigned)  ", total)),
            Span::styled(
                format!("[{}]", self.state.status_label()),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if lagging > 0 {
            header.push(Span::styled(
                format!("  {} behind on replication", lagging),
                Style::default().fg(Color::Red),
            ));
        }
        header.push(assign_hint);
        frame.render_widget(Paragraph::new(Line::from(header)), area);
    }

    fn draw_toolbar(&self, frame: &mut Frame, area: Rect) {
        let search_style = if self.search_active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let search_text = if self.search_active {
            format!(" Search: {}_", self.search)
        } else if self.search.is_empty() {
            " Search: [/]".to_string()
        } else {
            format!(" Search: {}", self.search)
        };

        let selected = self.modal.selection.len();
        let action_hint = if selected == 0 {
            Span::styled(
                "  [u] Unassign policy (select first)",
                Style::default().fg(Color::DarkGray),
            )
        } else {
            Span::styled(
                format!("  {} selected - [u] Unassign policy", selected),
                Style::default().fg(Color::Yellow),
            )
        };

        let toolbar = Line::from(vec![Span::styled(search_text, search_style), action_hint]);
        frame.render_widget(Paragraph::new(toolbar), area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let Some(view) = self.view() else {
            let text = if let Some(error) = self.state.error() {
                Line::from(Span::styled(
                    format!("  {}", error),
                    Style::default().fg(Color::Red),
                ))
            } else {
                Line::from(Span::styled(
                    "  Loading policies...",
                    Style::default().fg(Color::DarkGray),
                ))
            };
            frame.render_widget(Paragraph::new(text), area);
            return;
        };

        if view.rows.is_empty() {
            let message = if self.state.data().map(|s| s.is_empty()).unwrap_or(true) {
                "No disaster recovery policies are assigned to this application"
            } else if view.total_filtered == 0 {
                "No policies match the search"
            } else {
                // Filter narrowed while a later page was showing
                "Empty page - press [g] for the first page"
            };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    format!("  {}", message),
                    Style::default().fg(Color::DarkGray),
                ))),
                area,
            );
            return;
        }

        let header = Row::new(vec![
            Cell::from(" "),
            Cell::from("Policy"),
            Cell::from("Clusters"),
            Cell::from("Interval"),
            Cell::from("Sync status"),
            Cell::from("Activity"),
            Cell::from("DRPCs"),
        ])
        .style(Style::default().fg(Color::Yellow));

        let rows: Vec<Row> = view
            .rows
            .iter()
            .enumerate()
            .map(|(i, policy)| {
                let selected = self.modal.selection.contains(&policy.name);
                let marker = if selected { "[x]" } else { "[ ]" };
                let health = policy.sync_health;
                let mut row = Row::new(vec![
                    Cell::from(marker),
                    Cell::from(policy.name.clone()),
                    Cell::from(policy.dr_clusters.join(", ")),
                    Cell::from(policy.scheduling_interval.clone()),
                    Cell::from(Line::from(vec![
                        Span::styled(health.symbol(), Style::default().fg(health_color(health))),
                        Span::raw(format!(" {}", health.label())),
                    ])),
                    Cell::from(policy.activity.clone().unwrap_or_else(|| "-".to_string())),
                    Cell::from(policy.placement_controls.len().to_string()),
                ]);
                if i == self.cursor && !self.search_active {
                    row = row.style(Style::default().add_modifier(Modifier::REVERSED));
                } else if selected {
                    row = row.style(Style::default().fg(Color::Cyan));
                }
                row
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Min(16),
                Constraint::Min(14),
                Constraint::Length(8),
                Constraint::Length(14),
                Constraint::Min(12),
                Constraint::Length(5),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::TOP));

        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let (page, pages, filtered) = self
            .view()
            .map(|v| (v.page, v.page_count.max(1), v.total_filtered))
            .unwrap_or((self.page, 1, 0));

        let footer = Line::from(vec![
            Span::styled(
                format!(" Page {}/{} - {} policies ", page, pages, filtered),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                " [space] select  [a] all  [c] clear  [n/p] page  [/] search  [r] refresh  [q] quit",
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(footer), area);
    }

    fn draw_overlay(&self, frame: &mut Frame, area: Rect) {
        if self.modal.unassign_pending {
            self.draw_executing_dialog(frame, area);
            return;
        }
        match self.modal.action_context {
            Some(ActionContext::ConfirmingUnassign) => self.draw_confirm_dialog(frame, area),
            Some(ActionContext::UnassignSucceeded) | Some(ActionContext::UnassignFailed) => {
                self.draw_result_dialog(frame, area)
            }
            None => {}
        }
    }

    fn overlay_area(&self, area: Rect, height: u16) -> Rect {
        let width = 60.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(4));
        let x = (area.width.saturating_sub(width)) / 2;
        let y = (area.height.saturating_sub(height)) / 2;
        Rect::new(x, y, width, height)
    }

    fn draw_confirm_dialog(&self, frame: &mut Frame, area: Rect) {
        let overlay = self.overlay_area(area, 9);
        frame.render_widget(Clear, overlay);

        let title = self
            .modal
            .message
            .as_ref()
            .map(|m| m.title.clone())
            .unwrap_or_default();

        let mut lines = vec![Line::from("")];
        lines.push(Line::from(Span::styled(
            format!("  {}", title),
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(
                "  [y]",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Confirm unassign    "),
            Span::styled(
                "[n]",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Cancel"),
        ]));

        let block = Block::default()
            .title(" Confirm Unassign ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
            overlay,
        );
    }

    fn draw_executing_dialog(&self, frame: &mut Frame, area: Rect) {
        let overlay = self.overlay_area(area, 7);
        frame.render_widget(Clear, overlay);

        let count = self.modal.selection.len();
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  Unassigning {} policies...", count),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "  Please wait...",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let block = Block::default()
            .title(" Unassign in Progress ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        frame.render_widget(Paragraph::new(lines).block(block), overlay);
    }

    fn draw_result_dialog(&self, frame: &mut Frame, area: Rect) {
        let overlay = self.overlay_area(area, 9);
        frame.render_widget(Clear, overlay);

        let Some(message) = &self.modal.message else {
            return;
        };
        let color = variant_color(message.variant);
        let (icon, status) = match message.variant {
            MessageVariant::Danger => ("✗", "Failed"),
            _ => ("✓", "Completed"),
        };

        let mut lines = vec![Line::from("")];
        lines.push(Line::from(Span::styled(
            format!("  {} Unassign {}", icon, status),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::raw(format!("  {}", message.title))));
        if let Some(description) = &message.description {
            lines.push(Line::from(Span::styled(
                format!("  {}", description),
                Style::default().fg(color),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Press any key to continue...",
            Style::default().fg(Color::DarkGray),
        )));

        let block = Block::default()
            .title(format!(" Unassign {} ", status))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
            overlay,
        );
    }
}

impl Component for PoliciesComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // The pending overlay allows only display-state cancel; in-flight
        // requests are never cancelled.
        if self.modal.unassign_pending {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                self.close_overlay();
            }
            return Ok(None);
        }

        match self.modal.action_context {
            Some(ActionContext::ConfirmingUnassign) => {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                        self.start_unassign();
                    }
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
                        self.close_overlay();
                    }
                    _ => {}
                }
                Ok(None)
            }
            Some(ActionContext::UnassignSucceeded) | Some(ActionContext::UnassignFailed) => {
                self.close_overlay();
                Ok(None)
            }
            None => {
                if self.search_active {
                    self.handle_search_key(key);
                    return Ok(None);
                }
                Ok(self.handle_list_key(key))
            }
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => Ok(self.poll_unassign()),
            _ => Ok(None),
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        self.draw_main(frame, area);
        self.draw_overlay(frame, area);
        Ok(())
    }
}

fn health_color(health: ReplicationHealth) -> Color {
    match health {
        ReplicationHealth::Healthy => Color::Green,
        ReplicationHealth::Warning => Color::Yellow,
        ReplicationHealth::Critical => Color::Red,
        ReplicationHealth::Unknown => Color::DarkGray,
    }
}

fn variant_color(variant: MessageVariant) -> Color {
    match variant {
        MessageVariant::Info => Color::Yellow,
        MessageVariant::Success => Color::Green,
        MessageVariant::Danger => Color::Red,
    }
}
