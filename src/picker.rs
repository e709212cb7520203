//! The parent picker state machine.
//!
//! A [`Picker`] owns a snapshot of everything the control depends on: the
//! latest item collection, the resolved selection record, the text in the
//! input, and the current selection. Hosts feed it input and fetch results,
//! run the [`FetchRequest`]s and [`RecordRequest`]s it issues, and render
//! the [`View`] it derives.
//!
//! Every request carries a sequence number. A result is accepted only if it
//! answers the most recent request of its kind, so a slow response can never
//! overwrite a newer one.

mod debounce;
mod query;

use std::time::Instant;

use tracing::{debug, instrument, warn};

pub use debounce::Debouncer;
pub use query::{CollectionQuery, Order, FIELDS};

use crate::domain::{
    is_searching, options::unescape, options_from_items, reconcile, Config, Item, ItemId,
    SelectionRecord, View,
};

/// The parts of a post type the picker depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostType {
    /// Whether items of this type can have parents.
    pub hierarchical: bool,
    /// The label shown above the picker, e.g. "Parent Page:".
    pub parent_item_label: Option<String>,
}

impl PostType {
    /// A hierarchical post type with the given parent label.
    #[must_use]
    pub fn hierarchical(parent_item_label: impl Into<String>) -> Self {
        Self {
            hierarchical: true,
            parent_item_label: Some(parent_item_label.into()),
        }
    }
}

/// Where the picker is in its fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
    /// No collection has been requested yet.
    Idle,
    /// A collection request is in flight.
    Loading {
        /// Sequence number of the request being waited on.
        seq: u64,
    },
    /// The latest collection request has been answered.
    Loaded {
        /// Sequence number of the request that was answered.
        seq: u64,
    },
}

/// A collection fetch the host should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Sequence number to pass back with the result.
    pub seq: u64,
    /// The query to run.
    pub query: CollectionQuery,
}

/// A selection record lookup the host should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRequest {
    /// Sequence number to pass back with the result.
    pub seq: u64,
    /// The item to look up.
    pub id: ItemId,
}

/// The edit to apply to the document when the user picks a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentEdit {
    /// The new parent.
    pub parent: ItemId,
}

/// State and transitions of a parent picker.
#[derive(Debug)]
pub struct Picker {
    config: Config,
    post_type: PostType,
    post_id: Option<ItemId>,
    parent: Option<ItemId>,
    items: Vec<Item>,
    record: Option<SelectionRecord>,
    search_text: String,
    debouncer: Debouncer<String>,
    state: PickerState,
    items_seq: u64,
    record_seq: u64,
}

impl Picker {
    /// Creates a picker for the item `post_id`, whose current parent is
    /// `parent`.
    #[must_use]
    pub fn new(
        config: Config,
        post_type: PostType,
        post_id: Option<ItemId>,
        parent: Option<ItemId>,
    ) -> Self {
        let debouncer = Debouncer::new(config.debounce());
        Self {
            config,
            post_type,
            post_id,
            parent,
            items: Vec::new(),
            record: None,
            search_text: String::new(),
            debouncer,
            state: PickerState::Idle,
            items_seq: 0,
            record_seq: 0,
        }
    }

    /// Whether the picker is shown at all.
    ///
    /// Only hierarchical post types with a parent label get a picker.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.post_type.hierarchical && self.post_type.parent_item_label.is_some()
    }

    /// The label shown above the picker.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.post_type.parent_item_label.as_deref()
    }

    /// The current fetch state.
    #[must_use]
    pub const fn state(&self) -> PickerState {
        self.state
    }

    /// Whether a collection request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, PickerState::Loading { .. })
    }

    /// The current parent.
    #[must_use]
    pub const fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    /// The text the user has committed to the input.
    #[must_use]
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Records a keystroke. The search it implies is issued by
    /// [`Picker::poll`] once the input has been idle for the debounce
    /// interval.
    pub fn input_changed(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        if let Some(superseded) = self.debouncer.schedule(text, now) {
            debug!(%superseded, "search input superseded");
        }
    }

    /// Issues the debounced search, if it is due.
    #[instrument(level = "debug", skip(self))]
    pub fn poll(&mut self, now: Instant) -> Option<FetchRequest> {
        let text = self.debouncer.poll(now)?;
        self.search_text = text;
        self.refresh()
    }

    /// Issues a collection request for the current input immediately, e.g.
    /// because the backing collection changed.
    ///
    /// Returns `None` for post types without parents.
    pub fn refresh(&mut self) -> Option<FetchRequest> {
        if !self.post_type.hierarchical {
            return None;
        }

        self.items_seq += 1;
        let seq = self.items_seq;
        self.state = PickerState::Loading { seq };

        let search = is_searching(&self.search_text, self.record.as_ref())
            .then(|| self.search_text.clone());
        let query = CollectionQuery::new(self.config.per_page())
            .excluding(self.post_id)
            .with_search(search);

        debug!(seq, search = query.search.as_deref(), "requesting collection");
        Some(FetchRequest { seq, query })
    }

    /// Accepts the result of a collection request.
    ///
    /// Returns `false`, leaving the picker unchanged, if `seq` does not
    /// belong to the most recent request.
    #[instrument(level = "debug", skip(self, items), fields(items = items.len()))]
    pub fn items_loaded(&mut self, seq: u64, items: Vec<Item>) -> bool {
        if seq != self.items_seq || !self.is_loading() {
            if seq > self.items_seq {
                warn!(seq, latest = self.items_seq, "result for a request that was never issued");
            } else {
                debug!(seq, latest = self.items_seq, "discarding stale collection");
            }
            return false;
        }

        self.items = items;
        self.state = PickerState::Loaded { seq };
        true
    }

    /// Issues a lookup for the current parent's record.
    ///
    /// Returns `None` when there is no parent.
    pub fn request_selection_record(&mut self) -> Option<RecordRequest> {
        let id = self.parent?;
        self.record_seq += 1;
        Some(RecordRequest {
            seq: self.record_seq,
            id,
        })
    }

    /// Accepts the result of a selection record lookup.
    ///
    /// Returns `false` if `seq` does not belong to the most recent lookup, or
    /// if the record is not for the current parent.
    pub fn selection_record_loaded(&mut self, seq: u64, record: SelectionRecord) -> bool {
        if seq != self.record_seq {
            debug!(seq, latest = self.record_seq, "discarding stale selection record");
            return false;
        }
        if Some(record.id) != self.parent {
            debug!(id = %record.id, "discarding record for a different parent");
            return false;
        }

        self.record = Some(record);
        true
    }

    /// Updates the parent from outside the picker, e.g. an undo in the
    /// document.
    ///
    /// A loaded record for a different item is dropped.
    pub fn set_parent(&mut self, parent: Option<ItemId>) {
        if self.parent == parent {
            return;
        }
        self.parent = parent;
        if self.record.as_ref().map(|record| record.id) != parent {
            self.record = None;
        }
    }

    /// Picks `key` as the new parent.
    ///
    /// Returns the edit for the host to apply, or `None` if `key` is not one
    /// of the options currently shown. Any pending search is cancelled and
    /// the input shows the chosen item's name.
    #[instrument(level = "debug", skip(self))]
    pub fn select(&mut self, key: ItemId) -> Option<ParentEdit> {
        let view = self.view()?;
        if !view.options.iter().any(|option| option.key == key) {
            debug!(%key, "selection is not among the shown options");
            return None;
        }

        let name = self
            .items
            .iter()
            .find(|item| item.id == key)
            .map(|item| unescape(&item.display_name()).into_owned())
            .or_else(|| {
                self.record
                    .as_ref()
                    .filter(|record| record.id == key)
                    .map(|record| unescape(&record.display_name()).into_owned())
            })
            .unwrap_or_default();

        self.debouncer.cancel();
        self.search_text = name;
        self.set_parent(Some(key));
        Some(ParentEdit { parent: key })
    }

    /// Derives what the control should render.
    ///
    /// Returns `None` when there is nothing to render: the picker is not
    /// visible, or any collection request is in flight while the input is
    /// empty.
    #[must_use]
    pub fn view(&self) -> Option<View> {
        if !self.is_visible() {
            return None;
        }
        if self.search_text.is_empty() && self.is_loading() {
            return None;
        }

        let options = options_from_items(&self.items, self.config.indent());
        Some(reconcile(
            options,
            self.parent,
            self.record.as_ref(),
            &self.search_text,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::SelectOption;

    fn id(raw: u64) -> ItemId {
        ItemId::new(raw)
    }

    fn pages() -> Vec<Item> {
        vec![
            Item::new(1, None, "About"),
            Item::new(2, Some(1), "Team"),
            Item::new(5, None, "Home"),
        ]
    }

    fn picker(parent: Option<ItemId>) -> Picker {
        Picker::new(
            Config::default(),
            PostType::hierarchical("Parent Page:"),
            Some(id(100)),
            parent,
        )
    }

    fn loaded(parent: Option<ItemId>, items: Vec<Item>) -> Picker {
        let mut picker = picker(parent);
        let request = picker.refresh().unwrap();
        assert!(picker.items_loaded(request.seq, items));
        picker
    }

    #[test]
    fn hidden_without_hierarchy_or_label() {
        let flat = Picker::new(Config::default(), PostType::default(), None, None);
        assert!(!flat.is_visible());
        assert!(flat.view().is_none());

        let unlabelled = Picker::new(
            Config::default(),
            PostType {
                hierarchical: true,
                parent_item_label: None,
            },
            None,
            None,
        );
        assert!(!unlabelled.is_visible());
    }

    #[test]
    fn flat_post_types_never_fetch() {
        let mut flat = Picker::new(Config::default(), PostType::default(), None, None);
        assert_eq!(flat.refresh(), None);
        assert_eq!(flat.state(), PickerState::Idle);
    }

    #[test]
    fn first_load_renders_nothing_until_answered() {
        let mut picker = picker(None);
        let request = picker.refresh().unwrap();

        assert_eq!(picker.state(), PickerState::Loading { seq: request.seq });
        assert!(picker.view().is_none());

        picker.items_loaded(request.seq, pages());
        let view = picker.view().unwrap();

        assert_eq!(
            view.options,
            vec![
                SelectOption::new(id(1), "About"),
                SelectOption::new(id(2), "— Team"),
                SelectOption::new(id(5), "Home"),
            ]
        );
        assert_eq!(view.selected_index, None);
    }

    #[test]
    fn refresh_with_empty_input_hides_the_list() {
        let mut picker = loaded(None, pages());
        assert!(picker.view().is_some());

        let request = picker.refresh().unwrap();
        assert!(picker.view().is_none());

        picker.items_loaded(request.seq, pages());
        assert_eq!(picker.view().unwrap().options.len(), 3);
    }

    #[test]
    fn initial_query_excludes_the_edited_item() {
        let mut picker = picker(None);
        let request = picker.refresh().unwrap();

        assert_eq!(request.query.exclude, Some(id(100)));
        assert_eq!(request.query.parent_exclude, Some(id(100)));
        assert_eq!(request.query.per_page, 100);
        assert_eq!(request.query.search, None);
    }

    #[test]
    fn typing_issues_a_debounced_search() {
        let start = Instant::now();
        let mut picker = loaded(None, pages());

        picker.input_changed("T", start);
        picker.input_changed("Te", start + Duration::from_millis(100));
        assert_eq!(picker.poll(start + Duration::from_millis(300)), None);

        let request = picker.poll(start + Duration::from_millis(400)).unwrap();
        assert_eq!(request.query.search.as_deref(), Some("Te"));
        assert_eq!(picker.search_text(), "Te");
        assert!(picker.is_loading());

        // A search in flight keeps showing the previous options.
        assert_eq!(picker.view().unwrap().options.len(), 3);
    }

    #[test]
    fn stale_collections_are_discarded() {
        let mut picker = loaded(None, pages());
        let first = picker.refresh().unwrap();
        let second = picker.refresh().unwrap();

        assert!(picker.items_loaded(second.seq, vec![Item::new(9, None, "Fresh")]));
        assert!(!picker.items_loaded(first.seq, vec![Item::new(8, None, "Stale")]));

        let view = picker.view().unwrap();
        assert_eq!(view.options, vec![SelectOption::new(id(9), "Fresh")]);
        assert_eq!(picker.state(), PickerState::Loaded { seq: second.seq });
    }

    #[test]
    fn unissued_sequence_is_rejected() {
        let mut picker = picker(None);
        picker.refresh().unwrap();
        assert!(!picker.items_loaded(42, pages()));
        assert!(picker.is_loading());
    }

    #[test]
    fn selection_outside_the_page_is_listed_first() {
        let mut picker = loaded(Some(id(9)), pages());
        let lookup = picker.request_selection_record().unwrap();
        assert_eq!(lookup.id, id(9));
        assert!(picker.selection_record_loaded(lookup.seq, SelectionRecord::new(9, "Contact")));

        let view = picker.view().unwrap();
        assert_eq!(view.options[0], SelectOption::new(id(9), "Contact"));
        assert_eq!(view.selected_index, Some(0));
        assert_eq!(view.input_text, "Contact");
    }

    #[test]
    fn stale_records_are_discarded() {
        let mut picker = loaded(Some(id(9)), pages());
        let first = picker.request_selection_record().unwrap();
        let second = picker.request_selection_record().unwrap();

        assert!(!picker.selection_record_loaded(first.seq, SelectionRecord::new(9, "Old")));
        assert!(picker.selection_record_loaded(second.seq, SelectionRecord::new(9, "Contact")));
        assert_eq!(picker.view().unwrap().input_text, "Contact");
    }

    #[test]
    fn record_for_another_parent_is_discarded() {
        let mut picker = loaded(Some(id(9)), pages());
        let lookup = picker.request_selection_record().unwrap();
        assert!(!picker.selection_record_loaded(lookup.seq, SelectionRecord::new(4, "Other")));
    }

    #[test]
    fn search_results_do_not_list_the_selection() {
        let start = Instant::now();
        let mut picker = loaded(Some(id(9)), pages());
        let lookup = picker.request_selection_record().unwrap();
        picker.selection_record_loaded(lookup.seq, SelectionRecord::new(9, "Contact"));

        picker.input_changed("Foo", start);
        let request = picker.poll(start + Duration::from_millis(300)).unwrap();
        assert_eq!(request.query.search.as_deref(), Some("Foo"));
        picker.items_loaded(request.seq, vec![Item::new(5, None, "Foo Fighters")]);

        let view = picker.view().unwrap();
        assert_eq!(view.options, vec![SelectOption::new(id(5), "Foo Fighters")]);
        assert_eq!(view.selected_index, None);
    }

    #[test]
    fn selecting_returns_the_parent_edit() {
        let mut picker = loaded(None, pages());

        let edit = picker.select(id(2)).unwrap();

        assert_eq!(edit, ParentEdit { parent: id(2) });
        assert_eq!(picker.parent(), Some(id(2)));
        assert_eq!(picker.search_text(), "Team");
        assert_eq!(picker.view().unwrap().selected_index, Some(1));
    }

    #[test]
    fn selecting_an_unlisted_key_does_nothing() {
        let mut picker = loaded(Some(id(1)), pages());
        assert_eq!(picker.select(id(77)), None);
        assert_eq!(picker.parent(), Some(id(1)));
    }

    #[test]
    fn selecting_cancels_pending_search() {
        let start = Instant::now();
        let mut picker = loaded(None, pages());
        picker.input_changed("Ho", start);

        picker.select(id(5)).unwrap();

        assert_eq!(picker.poll(start + Duration::from_secs(1)), None);
        assert_eq!(picker.search_text(), "Home");
    }

    #[test]
    fn changing_parent_drops_mismatched_record() {
        let mut picker = loaded(Some(id(9)), pages());
        let lookup = picker.request_selection_record().unwrap();
        picker.selection_record_loaded(lookup.seq, SelectionRecord::new(9, "Contact"));

        picker.set_parent(Some(id(1)));

        let view = picker.view().unwrap();
        assert_eq!(view.selected_index, Some(0));
        assert!(view.options.iter().all(|option| option.key != id(9)));
        assert_eq!(picker.request_selection_record().map(|r| r.id), Some(id(1)));
    }
}
