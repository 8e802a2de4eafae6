//! Mirroring editor state into Slint models.
//!
//! Slint renders from `VecModel`s. These helpers copy the selection and the
//! routed link paths into models the UI binds to, updating rows in place so
//! unchanged rows are not re-created.

use std::fmt::Display;
use std::hash::Hash;
use std::rc::Rc;

use slint::{Model, ModelRc, SharedString, VecModel};

use crate::links::{LinkManager, RenderedLink};
use crate::selection::Selector;

/// Replace the contents of `model` with the selected ids, in selection
/// order.
pub fn sync_selection_to_model<K, D>(selector: &Selector<K, D>, model: &VecModel<SharedString>)
where
    K: Clone + Eq + Hash + std::fmt::Debug + Display,
    D: Clone,
{
    let ids: Vec<SharedString> = selector
        .ids()
        .map(|id| SharedString::from(id.to_string()))
        .collect();
    sync_rows(model, ids);
}

/// Row data handed to a path constructor.
#[derive(Clone, Debug, PartialEq)]
pub struct PathRow {
    pub id: SharedString,
    /// SVG path data in box-local coordinates.
    pub commands: SharedString,
    /// Logical position of the path's bounding box.
    pub x: f32,
    pub y: f32,
    pub stroke_width: f32,
    pub render_id: i32,
}

impl From<&RenderedLink> for PathRow {
    fn from(link: &RenderedLink) -> Self {
        let origin = link.path.transform();
        Self {
            id: SharedString::from(link.id.as_str()),
            commands: SharedString::from(link.path.to_svg()),
            x: origin.x,
            y: origin.y,
            stroke_width: link.stroke_width,
            render_id: link.render_id as i32,
        }
    }
}

/// Creating and updating Slint models of link paths.
pub trait LinkPathProvider {
    /// Build a new model. `constructor` turns a [`PathRow`] into the UI's
    /// link struct.
    fn create_paths_model<P, F>(&self, constructor: F) -> ModelRc<P>
    where
        P: Clone + 'static,
        F: Fn(PathRow) -> P;

    /// Update an existing model in place.
    fn update_paths_model<P, F>(&self, model: &VecModel<P>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(PathRow) -> P;
}

impl LinkPathProvider for LinkManager {
    fn create_paths_model<P, F>(&self, constructor: F) -> ModelRc<P>
    where
        P: Clone + 'static,
        F: Fn(PathRow) -> P,
    {
        let items: Vec<P> = self.iter().map(|link| constructor(PathRow::from(link))).collect();
        ModelRc::from(Rc::new(VecModel::from(items)))
    }

    fn update_paths_model<P, F>(&self, model: &VecModel<P>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(PathRow) -> P,
    {
        sync_rows(model, self.iter().map(|link| constructor(PathRow::from(link))));
    }
}

fn sync_rows<P, I>(model: &VecModel<P>, rows: I)
where
    P: Clone + 'static,
    I: IntoIterator<Item = P>,
{
    let mut count = 0;
    for (i, item) in rows.into_iter().enumerate() {
        if i < model.row_count() {
            model.set_row_data(i, item);
        } else {
            model.push(item);
        }
        count = i + 1;
    }
    while model.row_count() > count {
        model.remove(model.row_count() - 1);
    }
}
