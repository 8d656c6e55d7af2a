//! Tile-grid level files and the entity factory that expands them.
//!
//! A level is three equally sized grids of tile codes. The grid a code sits
//! in only decides processing order (main, background, foreground); the code
//! itself decides what gets spawned and where it lands.

use glam::Vec2;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::catalog::TextureId;
use crate::config::SimContext;
use crate::entity::Entity;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LevelFile {
    pub version: String,
    pub level_id: String,
    pub rows: usize,
    pub cols: usize,
    pub main: Vec<Vec<u8>>,
    #[serde(default)]
    pub background: Vec<Vec<u8>>,
    #[serde(default)]
    pub foreground: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileCode {
    Empty,
    Stone,
    Brick,
    EnemySpawn,
    PlayerSpawn,
    Grass,
    Bush,
    Fence,
}

impl TileCode {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Empty,
            1 => Self::Stone,
            2 => Self::Brick,
            3 => Self::EnemySpawn,
            4 => Self::PlayerSpawn,
            5 => Self::Grass,
            6 => Self::Bush,
            7 => Self::Fence,
            _ => return None,
        })
    }
}

/// Entities produced from a level file, grouped the way the simulation owns them.
#[derive(Debug, Clone)]
pub struct LevelLayout {
    pub level: Vec<Entity>,
    pub characters: Vec<Entity>,
    pub background: Vec<Entity>,
    pub foreground: Vec<Entity>,
    pub player_index: usize,
}

pub fn load_level_from_path(path: &Path) -> Result<LevelFile, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let level: LevelFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse level JSON {}: {e}", path.display()))?;
    validate_level(&level)?;
    Ok(level)
}

pub fn validate_level(level: &LevelFile) -> Result<(), String> {
    if level.version != "0.1" {
        return Err(format!(
            "Level validation failed: unsupported version '{}'",
            level.version
        ));
    }
    if level.level_id.trim().is_empty() {
        return Err("Level validation failed: level_id must be non-empty".to_string());
    }
    if level.rows == 0 || level.cols == 0 {
        return Err("Level validation failed: rows and cols must be > 0".to_string());
    }

    let mut player_spawns = 0;
    for (name, grid) in level.grids() {
        if grid.is_empty() && name != "main" {
            continue;
        }
        if grid.len() != level.rows {
            return Err(format!(
                "Level validation failed: grid '{name}' has {} rows, expected {}",
                grid.len(),
                level.rows
            ));
        }
        for (r, row) in grid.iter().enumerate() {
            if row.len() != level.cols {
                return Err(format!(
                    "Level validation failed: grid '{name}' row {r} has {} columns, expected {}",
                    row.len(),
                    level.cols
                ));
            }
            for (c, &code) in row.iter().enumerate() {
                match TileCode::from_code(code) {
                    None => {
                        return Err(format!(
                            "Level validation failed: unknown tile code {code} in '{name}' at ({r}, {c})"
                        ));
                    }
                    Some(TileCode::PlayerSpawn) => player_spawns += 1,
                    Some(_) => {}
                }
            }
        }
    }

    match player_spawns {
        0 => Err("Level validation failed: no player spawn".to_string()),
        1 => Ok(()),
        n => Err(format!(
            "Level validation failed: {n} player spawns, expected exactly one"
        )),
    }
}

impl LevelFile {
    /// Grids in processing order.
    fn grids(&self) -> [(&'static str, &Vec<Vec<u8>>); 3] {
        [
            ("main", &self.main),
            ("background", &self.background),
            ("foreground", &self.foreground),
        ]
    }
}

/// Expand `level` into entities. The same file always yields the same layout.
pub fn build_level(level: &LevelFile, ctx: &SimContext) -> Result<LevelLayout, String> {
    validate_level(level)?;
    let world = &ctx.config.world;
    let tile = world.tile_size;

    let mut layout = LevelLayout {
        level: Vec::new(),
        characters: Vec::new(),
        background: Vec::new(),
        foreground: Vec::new(),
        player_index: 0,
    };
    let mut player_index = None;

    for (_, grid) in level.grids() {
        for (r, row) in grid.iter().enumerate() {
            for (c, &code) in row.iter().enumerate() {
                let pos = Vec2::new(
                    c as f32 * tile,
                    world.logical_height - (level.rows - r) as f32 * tile,
                );
                let Some(code) = TileCode::from_code(code) else {
                    continue;
                };
                match code {
                    TileCode::Empty => {}
                    TileCode::Stone => layout.level.push(Entity::tile(pos, tile, TextureId::Stone)),
                    TileCode::Brick => layout.level.push(Entity::tile(pos, tile, TextureId::Brick)),
                    TileCode::Grass => layout.level.push(Entity::tile(pos, tile, TextureId::Grass)),
                    TileCode::Bush => layout
                        .foreground
                        .push(Entity::tile(pos, tile, TextureId::Bush)),
                    TileCode::Fence => layout
                        .background
                        .push(Entity::tile(pos, tile, TextureId::Fence)),
                    TileCode::EnemySpawn => layout
                        .characters
                        .push(Entity::enemy(pos, &ctx.config, &ctx.catalog)?),
                    TileCode::PlayerSpawn => {
                        layout
                            .characters
                            .push(Entity::player(pos, &ctx.config, &ctx.catalog)?);
                        player_index = Some(layout.characters.len() - 1);
                    }
                }
            }
        }
    }

    layout.player_index =
        player_index.ok_or_else(|| "Level validation failed: no player spawn".to_string())?;
    log::info!(
        "Built level '{}': {} tiles, {} characters, {} decor",
        level.level_id,
        layout.level.len(),
        layout.characters.len(),
        layout.background.len() + layout.foreground.len()
    );
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "plat_level_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn small_level() -> LevelFile {
        LevelFile {
            version: "0.1".to_string(),
            level_id: "test".to_string(),
            rows: 3,
            cols: 4,
            main: vec![vec![0, 0, 0, 0], vec![4, 0, 3, 0], vec![1, 2, 5, 1]],
            background: vec![vec![0, 0, 0, 0], vec![0, 7, 0, 0], vec![0, 0, 0, 0]],
            foreground: vec![vec![0, 0, 0, 6], vec![0, 0, 0, 0], vec![0, 0, 0, 0]],
        }
    }

    #[test]
    fn builds_layers_from_codes() {
        let ctx = SimContext::default();
        let layout = build_level(&small_level(), &ctx).expect("valid level");
        assert_eq!(layout.level.len(), 4);
        assert_eq!(layout.characters.len(), 2);
        assert_eq!(layout.background.len(), 1);
        assert_eq!(layout.foreground.len(), 1);
        assert_eq!(layout.player_index, 0);
        assert!(layout.characters[0].is_player());
        assert!(matches!(layout.characters[1].kind, EntityKind::Enemy(_)));
        assert_eq!(layout.background[0].texture, TextureId::Fence);
        assert_eq!(layout.foreground[0].texture, TextureId::Bush);
    }

    #[test]
    fn tiles_sit_flush_with_the_bottom_edge() {
        let ctx = SimContext::default();
        let layout = build_level(&small_level(), &ctx).expect("valid level");
        // Bottom row r = 2 of 3: y = 480 - (3 - 2) * 32.
        assert_eq!(layout.level[0].pos, Vec2::new(0.0, 448.0));
        assert_eq!(layout.level[3].pos, Vec2::new(96.0, 448.0));
        let player = &layout.characters[layout.player_index];
        assert_eq!(player.pos, Vec2::new(0.0, 416.0));
        assert_eq!(layout.foreground[0].pos, Vec2::new(96.0, 384.0));
    }

    #[test]
    fn factory_is_deterministic() {
        let ctx = SimContext::default();
        let a = build_level(&small_level(), &ctx).expect("valid level");
        let b = build_level(&small_level(), &ctx).expect("valid level");
        assert_eq!(a.level, b.level);
        assert_eq!(a.characters, b.characters);
        assert_eq!(a.background, b.background);
        assert_eq!(a.foreground, b.foreground);
        assert_eq!(a.player_index, b.player_index);
    }

    #[test]
    fn missing_player_is_rejected() {
        let mut level = small_level();
        level.main[1][0] = 0;
        let err = build_level(&level, &SimContext::default()).expect_err("no player");
        assert!(err.contains("no player spawn"));
    }

    #[test]
    fn second_player_is_rejected() {
        let mut level = small_level();
        level.foreground[0][0] = 4;
        let err = validate_level(&level).expect_err("two players");
        assert!(err.contains("2 player spawns"));
    }

    #[test]
    fn ragged_grid_is_rejected() {
        let mut level = small_level();
        level.background[1].pop();
        let err = validate_level(&level).expect_err("short row");
        assert!(err.contains("'background' row 1 has 3 columns"));
    }

    #[test]
    fn unknown_code_is_rejected() {
        let mut level = small_level();
        level.main[0][2] = 9;
        let err = validate_level(&level).expect_err("bad code");
        assert!(err.contains("unknown tile code 9 in 'main' at (0, 2)"));
    }

    #[test]
    fn decor_grids_are_optional() {
        let path = temp_file_path("no_decor");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "level_id": "bare",
              "rows": 2,
              "cols": 2,
              "main": [[4, 0], [1, 1]]
            }"#,
        )
        .expect("write temp file");
        let level = load_level_from_path(&path).expect("level without decor loads");
        let layout = build_level(&level, &SimContext::default()).expect("valid level");
        assert!(layout.background.is_empty());
        assert_eq!(layout.level.len(), 2);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn shipped_level_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/levels/level1.json");
        let level = load_level_from_path(&path).expect("shipped level should load");
        assert_eq!((level.rows, level.cols), (5, 50));
        let layout = build_level(&level, &SimContext::default()).expect("shipped level builds");
        assert!(layout.characters[layout.player_index].is_player());
        assert_eq!(layout.characters.len(), 7);
    }
}
