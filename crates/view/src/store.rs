//! Application-wide view state: view mode, rooms, highlighted and selected room.

use std::fmt;
use std::str::FromStr;

use scene::{Room, RoomId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    #[default]
    ThreeD,
    Floorplan,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::ThreeD => "3D",
            ViewMode::Floorplan => "Floorplan",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ViewMode::ThreeD => ViewMode::Floorplan,
            ViewMode::Floorplan => ViewMode::ThreeD,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseViewModeError(pub String);

impl fmt::Display for ParseViewModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown view mode {:?} (expected \"3D\" or \"Floorplan\")", self.0)
    }
}

impl std::error::Error for ParseViewModeError {}

impl FromStr for ViewMode {
    type Err = ParseViewModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "3d" => Ok(ViewMode::ThreeD),
            "floorplan" => Ok(ViewMode::Floorplan),
            _ => Err(ParseViewModeError(s.to_string())),
        }
    }
}

/// What a store mutation changed, as delivered to observers.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreChange {
    View(ViewMode),
    Rooms,
    Highlight(Option<RoomId>),
    Selection(Option<RoomId>),
}

pub type StoreObserver = Box<dyn FnMut(&ViewerStore, &StoreChange)>;

/// Highlighted and selected ids, when set, always name a room in `rooms`.
#[derive(Default)]
pub struct ViewerStore {
    view: ViewMode,
    rooms: Vec<Room>,
    highlighted: Option<RoomId>,
    selected: Option<RoomId>,
    observers: Vec<StoreObserver>,
}

impl fmt::Debug for ViewerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewerStore")
            .field("view", &self.view)
            .field("rooms", &self.rooms.len())
            .field("highlighted", &self.highlighted)
            .field("selected", &self.selected)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ViewerStore {
    pub fn new(view: ViewMode) -> Self {
        Self {
            view,
            ..Self::default()
        }
    }

    /// Registers a callback run synchronously after every mutation.
    pub fn subscribe(&mut self, observer: impl FnMut(&ViewerStore, &StoreChange) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == id)
    }

    pub fn highlighted_room_id(&self) -> Option<RoomId> {
        self.highlighted
    }

    pub fn selected_room_id(&self) -> Option<RoomId> {
        self.selected
    }

    pub fn toggle_view(&mut self) {
        self.set_view(self.view.toggled());
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
        self.notify(StoreChange::View(view));
    }

    pub fn add_room(&mut self, room: Room) {
        self.rooms.push(room);
        self.notify(StoreChange::Rooms);
    }

    /// Replaces the room list, dropping highlight and selection ids that no longer resolve.
    pub fn set_rooms(&mut self, rooms: Vec<Room>) {
        self.rooms = rooms;
        let stale_highlight = self.highlighted.is_some_and(|id| self.room(id).is_none());
        let stale_selection = self.selected.is_some_and(|id| self.room(id).is_none());
        if stale_highlight {
            self.highlighted = None;
        }
        if stale_selection {
            self.selected = None;
        }
        if stale_highlight {
            self.notify(StoreChange::Highlight(None));
        }
        if stale_selection {
            self.notify(StoreChange::Selection(None));
        }
        self.notify(StoreChange::Rooms);
    }

    pub fn clear_rooms(&mut self) {
        self.set_rooms(Vec::new());
    }

    /// Returns `false` (and changes nothing) for an id not in the room list.
    pub fn highlight_room(&mut self, id: RoomId) -> bool {
        if self.room(id).is_none() {
            tracing::debug!("ignoring highlight of unknown room {id}");
            return false;
        }
        self.highlighted = Some(id);
        self.notify(StoreChange::Highlight(Some(id)));
        true
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
        self.notify(StoreChange::Highlight(None));
    }

    /// Returns `false` (and changes nothing) for an id not in the room list.
    pub fn set_selected_room(&mut self, id: RoomId) -> bool {
        if self.room(id).is_none() {
            tracing::debug!("ignoring selection of unknown room {id}");
            return false;
        }
        self.selected = Some(id);
        self.notify(StoreChange::Selection(Some(id)));
        true
    }

    pub fn clear_selected_room(&mut self) {
        self.selected = None;
        self.notify(StoreChange::Selection(None));
    }

    fn notify(&mut self, change: StoreChange) {
        let mut observers = std::mem::take(&mut self.observers);
        for observer in &mut observers {
            observer(self, &change);
        }
        self.observers = observers;
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreChange, ViewMode, ViewerStore};
    use scene::{NodeId, Room, RoomId};
    use foundation::handles::Handle;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn room(index: u32, name: &str) -> Room {
        let group = NodeId(Handle::new(index, 0));
        Room {
            id: RoomId(group),
            name: name.to_string(),
            group,
            meshes: Vec::new(),
        }
    }

    #[test]
    fn defaults_to_3d_with_nothing_selected() {
        let store = ViewerStore::default();
        assert_eq!(store.view(), ViewMode::ThreeD);
        assert!(store.rooms().is_empty());
        assert_eq!(store.highlighted_room_id(), None);
        assert_eq!(store.selected_room_id(), None);
    }

    #[test]
    fn toggling_twice_restores_view() {
        let mut store = ViewerStore::default();
        store.toggle_view();
        assert_eq!(store.view(), ViewMode::Floorplan);
        store.toggle_view();
        assert_eq!(store.view(), ViewMode::ThreeD);
    }

    #[test]
    fn view_mode_text_round_trips() {
        for view in [ViewMode::ThreeD, ViewMode::Floorplan] {
            assert_eq!(view.to_string().parse::<ViewMode>(), Ok(view));
        }
        assert_eq!("floorplan".parse::<ViewMode>(), Ok(ViewMode::Floorplan));
        assert!("2D".parse::<ViewMode>().is_err());
    }

    #[test]
    fn clear_rooms_clears_highlight_and_selection() {
        let mut store = ViewerStore::default();
        store.set_rooms(vec![room(1, "Kitchen"), room(2, "Hall")]);
        let kitchen = store.rooms()[0].id;
        assert!(store.highlight_room(kitchen));
        assert!(store.set_selected_room(kitchen));

        store.clear_rooms();
        assert!(store.rooms().is_empty());
        assert_eq!(store.highlighted_room_id(), None);
        assert_eq!(store.selected_room_id(), None);
    }

    #[test]
    fn observers_never_see_ids_outside_the_room_list() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = ViewerStore::default();
        store.set_rooms(vec![room(1, "Kitchen")]);
        let kitchen = store.rooms()[0].id;
        store.highlight_room(kitchen);
        store.set_selected_room(kitchen);

        let log = seen.clone();
        store.subscribe(move |s, change| {
            log.borrow_mut().push((
                change.clone(),
                s.rooms().len(),
                s.highlighted_room_id(),
                s.selected_room_id(),
            ))
        });
        store.clear_rooms();

        assert_eq!(
            *seen.borrow(),
            vec![
                (StoreChange::Highlight(None), 0, None, None),
                (StoreChange::Selection(None), 0, None, None),
                (StoreChange::Rooms, 0, None, None),
            ]
        );
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut store = ViewerStore::default();
        store.set_rooms(vec![room(1, "Kitchen")]);
        let stranger = room(99, "Attic").id;
        assert!(!store.highlight_room(stranger));
        assert!(!store.set_selected_room(stranger));
        assert_eq!(store.highlighted_room_id(), None);
        assert_eq!(store.selected_room_id(), None);
    }

    #[test]
    fn replacing_rooms_drops_stale_ids_only() {
        let mut store = ViewerStore::default();
        store.set_rooms(vec![room(1, "Kitchen"), room(2, "Hall")]);
        let kitchen = store.rooms()[0].id;
        let hall = store.rooms()[1].id;
        store.highlight_room(kitchen);
        store.set_selected_room(hall);

        store.set_rooms(vec![room(2, "Hall")]);
        assert_eq!(store.highlighted_room_id(), None);
        assert_eq!(store.selected_room_id(), Some(hall));
    }

    #[test]
    fn observers_see_each_change_after_it_happened() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = ViewerStore::default();
        let log = seen.clone();
        store.subscribe(move |s, change| log.borrow_mut().push((change.clone(), s.view())));

        store.toggle_view();
        store.add_room(room(5, "Study"));
        let study = store.rooms()[0].id;
        store.highlight_room(study);
        store.clear_highlight();

        assert_eq!(
            *seen.borrow(),
            vec![
                (StoreChange::View(ViewMode::Floorplan), ViewMode::Floorplan),
                (StoreChange::Rooms, ViewMode::Floorplan),
                (StoreChange::Highlight(Some(study)), ViewMode::Floorplan),
                (StoreChange::Highlight(None), ViewMode::Floorplan),
            ]
        );
    }
}
