//! Geometry and hierarchy engine for a visual layout builder.
//!
//! A canvas holds positioned, sized rectangular components. The engine turns
//! pointer gestures (draw, resize, drag) into component mutations, snaps
//! dragged edges to sibling edges, aligns groups flexbox-style, and keeps a
//! containment tree of which component visually encloses which. The host UI
//! forwards pointer events and applies the returned [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Interaction controller; single writer of store and tree |
//! | [`doc`] | Component store, z-order and selection |
//! | [`tree`] | Containment tree and its re-resolution after a move |
//! | [`geometry`] | Points, sizes, bounds, handles and resize math |
//! | [`snap`] | Edge-alignment snapping |
//! | [`flex`] | Flex-style group alignment |
//! | [`hit`] | Hit-testing handles and components |
//! | [`input`] | Tools, modifiers, transform state and move coalescing |
//! | [`transform`] | Pure per-step transform math |
//! | [`worker`] | Background task running the transform math |
//! | [`config`] | Environment-driven engine tuning |
//! | [`replay`] | JSON gesture script replay |
//! | [`consts`] | Shared numeric constants (defaults, thresholds) |

pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod flex;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod replay;
pub mod snap;
pub mod transform;
pub mod tree;
pub mod worker;
