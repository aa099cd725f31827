//! Async facade over [`TreeViewModel`].
//!
//! Assembles the state machine with its collaborators, holds the readiness
//! barrier, executes [`Effect`]s and schedules refresh/reveal work through
//! [`ThrottledDelayer`]s. The model lock is never held across an `.await`.

use super::ports::{
    collapse_all_command_id, split_inline, CommandRegistry, CommandService, ContextMenuRenderer,
    ContextMenuRequest, MenuItem, MenuService, ProviderError, ProviderNotification, Settings,
    TreeDataProvider,
};
use super::throttle::ThrottledDelayer;
use crate::kernel::action::{Action, ClickModifier};
use crate::kernel::effect::Effect;
use crate::kernel::event::{tree_view_events, TreeViewEventReceiver, TreeViewEventSender};
use crate::kernel::tree_view::{TreeRow, TreeViewModel};
use crate::models::{DecorationSet, NodeId};
use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeViewOptions {
    #[serde(default)]
    pub show_collapse_all: bool,
}

#[derive(Clone)]
pub struct TreeViewCollaborators {
    pub commands: Arc<dyn CommandService>,
    pub registry: Arc<dyn CommandRegistry>,
    pub menus: Arc<dyn MenuService>,
    pub menu_renderer: Arc<dyn ContextMenuRenderer>,
}

/// Outcome of [`TreeViewService::init_tree_model`] as seen by waiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Readiness {
    Pending,
    Ready,
    Failed,
}

/// One delayer per logical target, so bursts for different targets never
/// supersede each other.
struct DelayerMap<K> {
    delay: Duration,
    delayers: Mutex<FxHashMap<K, Arc<ThrottledDelayer>>>,
}

impl<K: Hash + Eq + Clone> DelayerMap<K> {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            delayers: Mutex::new(FxHashMap::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FxHashMap<K, Arc<ThrottledDelayer>>> {
        self.delayers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get(&self, key: &K) -> Arc<ThrottledDelayer> {
        self.lock()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(ThrottledDelayer::new(self.delay)))
            .clone()
    }

    /// Drops the delayer of `key` once nobody else holds or has armed it.
    fn release(&self, key: &K, delayer: Arc<ThrottledDelayer>) {
        let mut delayers = self.lock();
        let idle = Arc::strong_count(&delayer) == 2 && !delayer.is_triggered();
        if idle && delayers.get(key).is_some_and(|d| Arc::ptr_eq(d, &delayer)) {
            delayers.remove(key);
        }
    }

    async fn trigger<F, Fut>(&self, key: K, task: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = ()>,
    {
        let delayer = self.get(&key);
        let ran = delayer.trigger(task).await;
        self.release(&key, delayer);
        ran
    }
}

struct Inner<P> {
    view_id: CompactString,
    options: TreeViewOptions,
    settings: Settings,
    provider: P,
    collaborators: TreeViewCollaborators,
    model: Mutex<Option<TreeViewModel>>,
    events: TreeViewEventSender,
    ready: watch::Sender<Readiness>,
    refresh_delayers: DelayerMap<Option<CompactString>>,
    reveal_delayers: DelayerMap<CompactString>,
}

pub struct TreeViewService<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for TreeViewService<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<P: TreeDataProvider> TreeViewService<P> {
    pub fn new(
        view_id: impl Into<CompactString>,
        options: TreeViewOptions,
        provider: P,
        collaborators: TreeViewCollaborators,
        settings: Settings,
    ) -> (Self, TreeViewEventReceiver) {
        let (events, rx) = tree_view_events();
        let (ready, _) = watch::channel(Readiness::Pending);
        let inner = Inner {
            view_id: view_id.into(),
            options,
            refresh_delayers: DelayerMap::new(settings.tree_view.refresh_delay()),
            reveal_delayers: DelayerMap::new(settings.tree_view.reveal_delay()),
            settings,
            provider,
            collaborators,
            model: Mutex::new(None),
            events,
            ready,
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    pub fn view_id(&self) -> &str {
        &self.inner.view_id
    }

    /// Runs `f` against the model; `None` before [`Self::init_tree_model`] finished building it.
    pub fn with_model<R>(&self, f: impl FnOnce(&mut TreeViewModel) -> R) -> Option<R> {
        let mut guard = self
            .inner
            .model
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        guard.as_mut().map(f)
    }

    pub fn is_ready(&self) -> bool {
        *self.inner.ready.borrow() == Readiness::Ready
    }

    /// Waits for [`Self::init_tree_model`] to finish; false if it failed.
    pub async fn when_ready(&self) -> bool {
        let mut rx = self.inner.ready.subscribe();
        let ready = match rx.wait_for(|ready| *ready != Readiness::Pending).await {
            Ok(ready) => *ready == Readiness::Ready,
            Err(_) => false,
        };
        ready
    }

    /// Resolves the root and its children, then installs the model. Provider
    /// failures are returned to the caller and release every waiter of
    /// [`Self::when_ready`] with `false`.
    pub async fn init_tree_model(&self) -> Result<(), ProviderError> {
        let model = match self.build_model().await {
            Ok(model) => model,
            Err(e) => {
                tracing::warn!(view = %self.inner.view_id, error = %e, "tree view init failed");
                self.inner.ready.send_replace(Readiness::Failed);
                return Err(e);
            }
        };
        *self
            .inner
            .model
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(model);

        self.register_collapse_all_command();
        self.inner.ready.send_replace(Readiness::Ready);
        tracing::info!(view = %self.inner.view_id, "tree view ready");
        Ok(())
    }

    async fn build_model(&self) -> Result<TreeViewModel, ProviderError> {
        let roots = self.inner.provider.resolve_children(None).await?;
        let root = roots.into_iter().next().ok_or(ProviderError::EmptyRoot)?;
        tracing::debug!(view = %self.inner.view_id, root = %root.id, "init tree model");

        let children = self.inner.provider.resolve_children(Some(&root)).await?;
        let mut model = TreeViewModel::new(
            self.inner.view_id.clone(),
            root,
            &self.inner.settings,
            self.inner.events.clone(),
        );
        let root = model.root();
        model
            .apply_children(root, children)
            .map_err(|e| ProviderError::Failed(e.to_string()))?;
        Ok(model)
    }

    fn register_collapse_all_command(&self) {
        if !self.inner.options.show_collapse_all {
            return;
        }
        let weak: Weak<Inner<P>> = Arc::downgrade(&self.inner);
        self.inner.collaborators.registry.register_command(
            &collapse_all_command_id(&self.inner.view_id),
            Box::new(move |_| {
                if let Some(inner) = weak.upgrade() {
                    TreeViewService { inner }.collapse_all();
                }
            }),
        );
    }

    pub fn focused(&self) -> Option<CompactString> {
        self.with_model(|m| m.focused_item_id()).flatten()
    }

    pub fn selected(&self) -> Vec<CompactString> {
        self.with_model(|m| m.selected_item_ids())
            .unwrap_or_default()
    }

    pub fn rows(&self) -> Vec<TreeRow> {
        self.with_model(|m| m.rows()).unwrap_or_default()
    }

    pub fn decorations_of(&self, id: NodeId) -> DecorationSet {
        self.with_model(|m| m.decorations_of(id))
            .unwrap_or_default()
    }

    /// Maps a provider item id to the node currently holding it.
    pub fn tree_node_id(&self, tree_item_id: &str) -> Option<NodeId> {
        self.with_model(|m| m.node_by_item_id(tree_item_id))
            .flatten()
    }

    async fn resolve_children_of(&self, node: NodeId) -> Result<(), ProviderError> {
        let item = self
            .with_model(|m| {
                let item = m.tree().item(node).cloned()?;
                m.begin_resolve(node);
                Some(item)
            })
            .flatten();
        let Some(item) = item else {
            return Ok(());
        };

        match self.inner.provider.resolve_children(Some(&item)).await {
            Ok(children) => {
                let applied = self.with_model(|m| m.apply_children(node, children));
                if let Some(Err(e)) = applied {
                    tracing::debug!(item_id = %item.id, error = %e, "node vanished while resolving");
                }
                Ok(())
            }
            Err(e) => {
                self.with_model(|m| m.end_resolve(node));
                Err(e)
            }
        }
    }

    pub async fn toggle_expansion(&self, node: NodeId) {
        let state = self
            .with_model(|m| {
                let tree = m.tree();
                tree.is_composite(node)
                    .then(|| (tree.is_expanded(node), tree.is_resolved(node)))
            })
            .flatten();
        match state {
            None => {}
            Some((true, _)) => {
                self.with_model(|m| m.set_expanded(node, false, true));
            }
            Some((false, resolved)) => {
                if !resolved {
                    if let Err(e) = self.resolve_children_of(node).await {
                        tracing::warn!(
                            view = %self.inner.view_id,
                            error = %e,
                            "resolve children failed"
                        );
                        return;
                    }
                }
                self.with_model(|m| m.set_expanded(node, true, true));
            }
        }
    }

    /// Re-resolves `node` and every expanded descendant without expansion events.
    async fn reload_quiet(&self, node: NodeId) {
        let start = self
            .with_model(|m| {
                let item_id: CompactString = m.tree().item_id(node)?.into();
                Some((item_id, m.expanded_item_ids_under(node)))
            })
            .flatten();
        let Some((item_id, expanded)) = start else {
            return;
        };

        let mut queue: VecDeque<CompactString> = VecDeque::from([item_id]);
        while let Some(item_id) = queue.pop_front() {
            let Some(node) = self.tree_node_id(&item_id) else {
                continue;
            };
            if let Err(e) = self.resolve_children_of(node).await {
                tracing::warn!(item_id = %item_id, error = %e, "reload children failed");
                continue;
            }
            let reopened = self
                .with_model(|m| {
                    let children = m.tree().children(node).map(<[NodeId]>::to_vec);
                    let mut reopened = Vec::new();
                    for child in children.unwrap_or_default() {
                        let Some(child_item) = m.tree().item_id(child).map(CompactString::from)
                        else {
                            continue;
                        };
                        if expanded.contains(&child_item) {
                            m.set_expanded(child, true, false);
                            reopened.push(child_item);
                        }
                    }
                    reopened
                })
                .unwrap_or_default();
            queue.extend(reopened);
        }
    }

    /// Coalesced refresh. `None` reloads the whole tree; bursts are coalesced per target.
    pub async fn refresh(&self, tree_item_id: Option<CompactString>) -> bool {
        if !self.when_ready().await {
            return false;
        }
        let this = self;
        let key = tree_item_id.clone();
        self.inner
            .refresh_delayers
            .trigger(key, move || async move {
                let target = match tree_item_id {
                    None => this.with_model(|m| m.root()),
                    Some(item_id) => this
                        .with_model(|m| {
                            let node = m.node_by_item_id(&item_id)?;
                            let tree = m.tree();
                            let target = if tree.is_composite(node) {
                                node
                            } else {
                                tree.parent(node)?
                            };
                            tree.is_resolved(target).then_some(target)
                        })
                        .flatten()
                        .or_else(|| {
                            tracing::debug!(item_id = %item_id, "refresh target not found");
                            None
                        }),
                };
                if let Some(target) = target {
                    this.reload_quiet(target).await;
                }
            })
            .await
    }

    /// Coalesced reveal: makes the item visible and selects it.
    pub async fn reveal(&self, tree_item_id: CompactString) -> bool {
        if !self.when_ready().await {
            return false;
        }
        let this = self;
        let key = tree_item_id.clone();
        self.inner
            .reveal_delayers
            .trigger(key, move || async move {
                let revealed = this
                    .with_model(|m| {
                        let node = m.node_by_item_id(&tree_item_id)?;
                        m.reveal(node)
                    })
                    .flatten();
                if revealed.is_none() {
                    tracing::debug!(item_id = %tree_item_id, "reveal target not found");
                }
            })
            .await
    }

    /// Pumps provider notifications until the channel closes.
    pub async fn run_notifications(&self, mut rx: mpsc::UnboundedReceiver<ProviderNotification>) {
        while let Some(notification) = rx.recv().await {
            let this = self.clone();
            match notification {
                ProviderNotification::TreeDataChanged(item) => {
                    tokio::spawn(async move {
                        this.refresh(item).await;
                    });
                }
                ProviderNotification::RevealRequested(item) => {
                    tokio::spawn(async move {
                        this.reveal(item).await;
                    });
                }
            }
        }
    }

    /// Routes an input action from the view layer.
    pub async fn dispatch(&self, action: Action) {
        match action {
            Action::ClickRow { row, modifier, now } => {
                let Some(node) = self.node_at_row(row) else {
                    return;
                };
                self.click(node, modifier, now).await;
            }
            Action::ClickNode {
                node,
                modifier,
                now,
            } => self.click(node, modifier, now).await,
            Action::ContextMenuOpen { row, x, y } => {
                let node = row.and_then(|row| self.node_at_row(row));
                self.handle_context_menu(node, (x, y)).await;
            }
            Action::ContextMenuClose => self.restore_context_focus(),
            Action::Blur => self.handle_tree_blur(),
            Action::CollapseAll => self.collapse_all(),
            Action::Tick { now } => self.poll_click_timer(now).await,
        }
    }

    fn node_at_row(&self, row: usize) -> Option<NodeId> {
        self.with_model(|m| m.tree().node_at_index(row)).flatten()
    }

    async fn click(&self, node: NodeId, modifier: ClickModifier, now: Instant) {
        match modifier {
            ClickModifier::None => self.handle_item_click(node, now).await,
            ClickModifier::Range => self.handle_item_range_click(node, now).await,
            ClickModifier::Toggle => self.handle_item_toggle_click(node),
        }
    }

    pub async fn handle_item_click(&self, node: NodeId, now: Instant) {
        let clicked = self.with_model(|m| (m.handle_item_click(node, now), m.click_deadline()));
        let Some((effects, deadline)) = clicked else {
            return;
        };
        if let Some(deadline) = deadline {
            self.arm_click_timer(deadline);
        }
        self.run_effects(effects).await;
    }

    /// Resolves the pending click gesture once its window elapses.
    ///
    /// Every click re-arms a timer; timers of superseded windows poll before the
    /// new deadline and resolve nothing.
    fn arm_click_timer(&self, deadline: Instant) {
        let this = self.clone();
        let delay = deadline.saturating_duration_since(Instant::now());
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.poll_click_timer(deadline).await;
        });
    }

    pub async fn handle_item_range_click(&self, node: NodeId, now: Instant) {
        let effects = self
            .with_model(|m| m.handle_item_range_click(node, now))
            .unwrap_or_default();
        self.run_effects(effects).await;
    }

    pub fn handle_item_toggle_click(&self, node: NodeId) {
        self.with_model(|m| m.handle_item_toggle_click(node));
    }

    pub async fn poll_click_timer(&self, now: Instant) {
        let effects = self
            .with_model(|m| m.poll_click_timer(now))
            .unwrap_or_default();
        self.run_effects(effects).await;
    }

    pub async fn handle_context_menu(&self, node: Option<NodeId>, anchor: (i32, i32)) {
        let Some(effect) = self.with_model(|m| m.handle_context_menu(node, anchor)) else {
            return;
        };
        self.run_effects(vec![effect]).await;
    }

    pub fn handle_tree_blur(&self) {
        self.with_model(|m| m.handle_tree_blur());
    }

    pub fn restore_context_focus(&self) {
        self.with_model(|m| m.restore_context_focus());
    }

    pub fn collapse_all(&self) {
        self.with_model(|m| m.collapse_all());
    }

    /// Entries rendered inline on a row with the given `viewItem` value.
    pub fn inline_menu_items(&self, context_value: Option<&str>) -> Vec<MenuItem> {
        let items = self
            .inner
            .collaborators
            .menus
            .menu_items(&self.inner.view_id, context_value);
        split_inline(items).0
    }

    async fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ExecuteCommand { id, arguments } => {
                    tracing::debug!(command = %id, "execute tree item command");
                    self.inner.collaborators.commands.execute_command(&id, arguments);
                }
                Effect::ToggleExpansion(node) => self.toggle_expansion(node).await,
                Effect::ShowContextMenu(target) => {
                    let items = self
                        .inner
                        .collaborators
                        .menus
                        .menu_items(&self.inner.view_id, target.context_value.as_deref());
                    let (_, menu_nodes) = split_inline(items);
                    self.inner
                        .collaborators
                        .menu_renderer
                        .show(ContextMenuRequest {
                            anchor: target.anchor,
                            menu_nodes,
                            args: target.args,
                        });
                }
            }
        }
    }
}
