//! Gesture script replay.
//!
//! A script is a JSON list of steps (component creation, pointer events,
//! selection and layout commands) run against a fresh [`Engine`]. Components
//! are referred to by name, since ids are generated at creation. The result is
//! a [`ReplayReport`] with every component and the containment hierarchy.

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::doc::{ComponentId, ComponentSpec, StoreError};
use crate::engine::{Action, Engine};
use crate::flex::{Direction, FlexOp};
use crate::geometry::{Bounds, Point, Size};
use crate::input::{ComponentTemplate, Modifiers, Tool};
use crate::worker::{GeometryWorker, WorkerError};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("invalid script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("step {step}: no component named {name:?}")]
    UnknownComponent { step: usize, name: String },
    #[error("step {step}: {source}")]
    Store { step: usize, source: StoreError },
    #[error("geometry worker failed: {0}")]
    Worker(#[from] WorkerError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Canvas extent; the configured default when absent.
    #[serde(default)]
    pub canvas: Option<Size>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerMove {
    Front,
    Forward,
    Backward,
    Back,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Create {
        #[serde(flatten)]
        spec: ComponentSpec,
    },
    Canvas {
        width: f64,
        height: f64,
    },
    Tool {
        tool: Tool,
    },
    Template {
        template: Option<ComponentTemplate>,
    },
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Coalesced move; applied by the next `frame` or `pointer_up`.
    PointerMove {
        x: f64,
        y: f64,
    },
    Frame,
    /// Immediate move, computed on the worker when one is attached.
    PointerStep {
        x: f64,
        y: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    Select {
        names: Vec<String>,
    },
    Align {
        #[serde(default)]
        direction: Direction,
        flex: FlexOp,
    },
    Delete {
        name: String,
    },
    DeleteSelection,
    Layer {
        name: String,
        to: LayerMove,
    },
    Rename {
        name: String,
        to: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentReport {
    pub id: ComponentId,
    pub name: String,
    pub bounds: Bounds,
    pub layer: i64,
    /// Name of the containment parent.
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyNode {
    pub name: String,
    pub children: Vec<HierarchyNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    /// Bottom to top.
    pub components: Vec<ComponentReport>,
    /// Root components bottom to top, each with its subtree.
    pub hierarchy: Vec<HierarchyNode>,
    pub selection: Vec<String>,
    /// Total actions emitted while replaying.
    pub actions: usize,
}

pub fn parse_script(json: &str) -> Result<Script, ReplayError> {
    Ok(serde_json::from_str(json)?)
}

/// Replay `script` on a new engine. With a worker attached, `pointer_step`
/// moves are computed off-thread.
pub async fn run_script(
    script: &Script,
    config: EngineConfig,
    worker: Option<&GeometryWorker>,
) -> Result<ReplayReport, ReplayError> {
    let mut engine = Engine::new(config);
    if let Some(canvas) = script.canvas {
        engine.set_canvas_size(canvas);
    }
    info!(steps = script.steps.len(), worker = worker.is_some(), "replay started");

    let mut actions = 0;
    for (index, step) in script.steps.iter().enumerate() {
        let step_number = index + 1;
        debug!(step = step_number, ?step, "replaying");
        let emitted = apply_step(&mut engine, step_number, step, worker).await?;
        actions += emitted.len();
    }

    let report = build_report(&engine, actions);
    info!(components = report.components.len(), actions, "replay finished");
    Ok(report)
}

fn resolve(engine: &Engine, step: usize, name: &str) -> Result<ComponentId, ReplayError> {
    engine
        .store()
        .components_by_layer()
        .into_iter()
        .find(|c| c.name == name)
        .map(|c| c.id)
        .ok_or_else(|| ReplayError::UnknownComponent { step, name: name.to_owned() })
}

async fn apply_step(
    engine: &mut Engine,
    step: usize,
    op: &Step,
    worker: Option<&GeometryWorker>,
) -> Result<Vec<Action>, ReplayError> {
    let store_err = |source: StoreError| ReplayError::Store { step, source };
    let actions = match op {
        Step::Create { spec } => engine.create_component(spec.clone()).1,
        Step::Canvas { width, height } => engine.set_canvas_size(Size::new(*width, *height)),
        Step::Tool { tool } => {
            engine.set_tool(*tool);
            Vec::new()
        }
        Step::Template { template } => {
            engine.set_template(template.clone());
            Vec::new()
        }
        Step::PointerDown { x, y, modifiers } => engine.on_pointer_down(Point::new(*x, *y), *modifiers),
        Step::PointerMove { x, y } => {
            engine.on_pointer_move(Point::new(*x, *y));
            Vec::new()
        }
        Step::Frame => engine.on_animation_frame(),
        Step::PointerStep { x, y } => {
            let point = Point::new(*x, *y);
            match (worker, engine.transform_request(point)) {
                (Some(worker), Some(request)) => {
                    let response = worker.transform(request).await?;
                    engine.apply_transform_response(&response)
                }
                (Some(_), None) => Vec::new(),
                (None, _) => engine.apply_pointer_move(point),
            }
        }
        Step::PointerUp { x, y } => engine.on_pointer_up(Point::new(*x, *y)),
        Step::Select { names } => {
            let ids = names
                .iter()
                .map(|n| resolve(engine, step, n))
                .collect::<Result<Vec<_>, _>>()?;
            engine.select(&ids)
        }
        Step::Align { direction, flex } => engine.align_selection(*direction, *flex),
        Step::Delete { name } => {
            let id = resolve(engine, step, name)?;
            engine.delete_component(&id).map_err(store_err)?
        }
        Step::DeleteSelection => engine.delete_selection(),
        Step::Layer { name, to } => {
            let id = resolve(engine, step, name)?;
            match to {
                LayerMove::Front => engine.bring_to_front(&id),
                LayerMove::Forward => engine.bring_forward(&id),
                LayerMove::Backward => engine.send_backward(&id),
                LayerMove::Back => engine.send_to_back(&id),
            }
            .map_err(store_err)?
        }
        Step::Rename { name, to } => {
            let id = resolve(engine, step, name)?;
            engine.rename(&id, to).map_err(store_err)?
        }
    };
    Ok(actions)
}

fn build_report(engine: &Engine, actions: usize) -> ReplayReport {
    let store = engine.store();
    let tree = engine.tree();
    let name_of = |id: &ComponentId| store.get(id).map(|c| c.name.clone());

    let components = store
        .components_by_layer()
        .into_iter()
        .map(|c| ComponentReport {
            id: c.id,
            name: c.name.clone(),
            bounds: c.bounds,
            layer: c.layer,
            parent: tree.parent_of(&c.id).and_then(|p| name_of(&p)),
        })
        .collect();

    let hierarchy = by_layer(engine, tree.roots())
        .into_iter()
        .filter_map(|r| subtree(engine, r))
        .collect();

    let mut selection: Vec<String> = store.selection().iter().filter_map(|id| name_of(id)).collect();
    selection.sort();

    ReplayReport { components, hierarchy, selection, actions }
}

fn by_layer(engine: &Engine, mut ids: Vec<ComponentId>) -> Vec<ComponentId> {
    ids.sort_by_key(|id| engine.store().get(id).map_or(i64::MAX, |c| c.layer));
    ids
}

fn subtree(engine: &Engine, id: ComponentId) -> Option<HierarchyNode> {
    let name = engine.store().get(&id)?.name.clone();
    let children = engine
        .tree()
        .children_of(&id)
        .map(|c| by_layer(engine, c.iter().copied().collect()))
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| subtree(engine, c))
        .collect();
    Some(HierarchyNode { name, children })
}
