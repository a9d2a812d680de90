pub mod menu;

pub use menu::{
    ListMenusFilter, Menu, MenuChanges, MenuPage, MenuSort, NewMenu, SortField, MENU_COLUMNS,
};
