//! List orchestration: loading, selection bookkeeping, and the
//! confirm-act-reload workflows for deleting and duplicating stacks.
//!
//! The controller owns no remote logic of its own; every network call goes
//! through the repository, and every user-visible outcome goes through the
//! notification/dialog collaborators. Remote failures are converted into
//! view state or notifications here and never propagate further.

use std::collections::HashMap;

use futures::future::join_all;

use crate::model::Stack;
use crate::repository::StackRepository;
use crate::ui::{ConfirmDialog, Confirmation, NotificationSink};

/// One list-loading cycle: idle until the first load, loading while a
/// triggering request is in flight, then ready or error. On error the stale
/// cache keeps rendering as best effort.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListPhase {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Immutable snapshot handed to the rendering layer. Produced by `view()`;
/// nothing in it aliases controller state.
#[derive(Clone, Debug)]
pub struct ListViewState {
    pub phase: ListPhase,
    pub error: Option<String>,
    pub rows: Vec<StackRow>,
    pub all_selected: bool,
    pub none_selected: bool,
}

#[derive(Clone, Debug)]
pub struct StackRow {
    pub stack: Stack,
    pub selected: bool,
    /// Whether the acting user owns this stack (only own stacks are eligible
    /// for select-all).
    pub own: bool,
}

pub struct StackListController<N, C> {
    repo: StackRepository,
    notifier: N,
    dialog: C,
    user_id: Option<String>,
    selection: HashMap<String, bool>,
    all_selected: bool,
    none_selected: bool,
    phase: ListPhase,
    error: Option<String>,
}

impl<N: NotificationSink, C: ConfirmDialog> StackListController<N, C> {
    pub fn new(repo: StackRepository, user_id: Option<String>, notifier: N, dialog: C) -> Self {
        Self {
            repo,
            notifier,
            dialog,
            user_id,
            selection: HashMap::new(),
            all_selected: false,
            none_selected: true,
            phase: ListPhase::Idle,
            error: None,
        }
    }

    pub fn repository(&self) -> &StackRepository {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut StackRepository {
        &mut self.repo
    }

    pub fn phase(&self) -> ListPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_all_selected(&self) -> bool {
        self.all_selected
    }

    pub fn is_none_selected(&self) -> bool {
        self.none_selected
    }

    pub fn view(&self) -> ListViewState {
        let rows = self
            .repo
            .list()
            .iter()
            .map(|stack| {
                let selected = stack
                    .id
                    .as_deref()
                    .map(|id| self.selection.get(id).copied().unwrap_or(false))
                    .unwrap_or(false);
                let own = self.user_id.is_some() && stack.creator == self.user_id;
                StackRow {
                    stack: stack.clone(),
                    selected,
                    own,
                }
            })
            .collect();
        ListViewState {
            phase: self.phase,
            error: self.error.clone(),
            rows,
            all_selected: self.all_selected,
            none_selected: self.none_selected,
        }
    }

    /// Re-synchronizes the list. "Not modified" counts as success; any other
    /// failure flips the phase to error while the stale rows stay renderable.
    pub async fn load_stacks(&mut self) {
        self.phase = ListPhase::Loading;
        // Selection over a soon-to-be-replaced list is stale; reconcile the
        // derived flags before the fetch settles.
        self.update_selection_state();

        match self.repo.fetch_stacks().await {
            Ok(_) => {
                self.error = None;
                self.phase = ListPhase::Ready;
            }
            Err(err) => {
                self.error = Some(format!("{:#}", err));
                self.phase = ListPhase::Error;
            }
        }
    }

    /// Confirms and deletes one stack, then reloads. Declining the dialog
    /// abandons the workflow; a delete failure is notified and skips the
    /// reload.
    pub async fn delete_stack(&mut self, stack: &Stack) {
        let Some(id) = stack.id.clone() else {
            self.notifier
                .show_error(&format!("Stack {} has not been created yet.", stack.name));
            return;
        };
        if self.confirm_deletion(1, Some(&stack.name)) == Confirmation::Declined {
            return;
        }

        self.phase = ListPhase::Loading;
        match self.repo.delete_stack(&id).await {
            Ok(()) => {
                self.selection.remove(&id);
                self.notifier.show_info(&format!(
                    "Stack {} has been successfully removed.",
                    stack.name
                ));
                self.load_stacks().await;
            }
            Err(err) => {
                self.phase = ListPhase::Ready;
                self.notifier.show_error(&format!(
                    "Failed to delete stack {}. {:#}",
                    stack.name, err
                ));
            }
        }
    }

    /// Deletes every selected stack in one confirmed batch. The deletes fly
    /// concurrently; the outcome is reported in aggregate only, and the list
    /// reloads regardless so the view reflects whatever the backend kept.
    pub async fn delete_selected(&mut self) {
        let ids = self.selected_ids();
        if ids.is_empty() {
            self.notifier.show_error("No selected stacks.");
            return;
        }
        if self.confirm_deletion(ids.len(), None) == Confirmation::Declined {
            return;
        }

        self.phase = ListPhase::Loading;
        // Flags drop at fire time; the unconditional reload reconciles the
        // rows with what actually got deleted.
        for id in &ids {
            self.selection.insert(id.clone(), false);
        }

        let results = join_all(ids.iter().map(|id| self.repo.delete_stack(id))).await;
        if results.iter().all(|r| r.is_ok()) {
            self.notifier
                .show_info("Selected stacks have been successfully removed.");
        } else {
            self.notifier.show_error("Failed to delete selected stack(s).");
        }
        self.load_stacks().await;
    }

    /// Creates a copy of `stack` under a fresh `<name>-copy-<suffix>` name,
    /// with every backend-assigned field stripped, then reloads.
    pub async fn duplicate_stack(&mut self, stack: &Stack) {
        let mut copy = stack.clone();
        copy.id = None;
        copy.creator = None;
        copy.links = None;
        copy.name = match self.repo.generate_stack_name(&format!("{}-copy", stack.name)) {
            Ok(name) => name,
            Err(err) => {
                self.notifier
                    .show_error(&format!("Failed to copy stack {}. {:#}", stack.name, err));
                return;
            }
        };

        self.phase = ListPhase::Loading;
        match self.repo.create_stack(&copy).await {
            Ok(_) => self.load_stacks().await,
            Err(err) => {
                self.phase = ListPhase::Ready;
                self.notifier
                    .show_error(&format!("Failed to create stack {}. {:#}", copy.name, err));
            }
        }
    }

    /// Selects exactly the stacks owned by the acting user; everyone else's
    /// stacks are not eligible for deletion. Rebuilds the selection from
    /// scratch.
    pub fn select_all(&mut self) {
        self.selection.clear();
        if let Some(user_id) = self.user_id.clone() {
            for stack in self.repo.list() {
                if stack.creator.as_deref() == Some(user_id.as_str())
                    && let Some(id) = &stack.id
                {
                    self.selection.insert(id.clone(), true);
                }
            }
        }
        self.update_selection_state();
    }

    pub fn deselect_all(&mut self) {
        for selected in self.selection.values_mut() {
            *selected = false;
        }
        self.update_selection_state();
    }

    pub fn toggle_all(&mut self) {
        if self.all_selected {
            self.deselect_all();
        } else {
            self.select_all();
        }
    }

    pub fn set_selected(&mut self, stack_id: &str, selected: bool) {
        self.selection.insert(stack_id.to_string(), selected);
        self.update_selection_state();
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selection
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// `all_selected` means the selection map is non-empty and every entry in
    /// it is flagged; `none_selected` means no entry is flagged.
    fn update_selection_state(&mut self) {
        self.none_selected = true;
        self.all_selected = !self.selection.is_empty();
        for selected in self.selection.values() {
            if *selected {
                self.none_selected = false;
            } else {
                self.all_selected = false;
            }
        }
    }

    fn confirm_deletion(&self, count: usize, stack_name: Option<&str>) -> Confirmation {
        let mut content = String::from("Would you like to delete ");
        if count > 1 {
            content.push_str(&format!("these {} stacks?", count));
        } else {
            match stack_name {
                Some(name) => {
                    content.push_str(name);
                    content.push('?');
                }
                None => content.push_str("this selected stack?"),
            }
        }
        self.dialog.confirm("Remove stacks", &content, "Delete")
    }
}
