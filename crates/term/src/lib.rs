//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer for terminal play. It avoids widget
//! toolkits and renders into a plain framebuffer that is diffed and flushed to
//! the terminal.
//!
//! - [`tiles`]: tile value → style and label
//! - [`game_view`]: snapshot → framebuffer (pure)
//! - [`renderer`]: framebuffer → terminal (crossterm)

pub mod fb;
pub mod game_view;
pub mod renderer;
pub mod tiles;

pub use nexus_2048_core as core;
pub use nexus_2048_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AdapterStatusView, AnchorY, GameView, HudInfo, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
pub use tiles::{tile_label, tile_style};
