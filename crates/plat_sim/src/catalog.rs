//! Resource handles the simulation attaches to entities.
//!
//! Textures and clips are opaque identifiers. The catalog only records what
//! the simulation needs to know about them: the pixel size of each sprite
//! sheet (bullet colliders and draw rects are derived from it) and the frame
//! timing of each clip. Decoding and uploading the images is the renderer's
//! business.
//!
//! Sprite sheets are horizontal strips of square frames, so a sheet's frame
//! side equals its height.

use std::collections::BTreeMap;

use plat_core::animation::{Animation, AnimationSet, ClipSpec};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureId {
    PlayerIdle,
    PlayerRun,
    PlayerJump,
    PlayerSlide,
    PlayerDie,
    Stone,
    Brick,
    Grass,
    Bush,
    Fence,
    Bullet,
    BulletHit,
    Spiny,
    SpinyDead,
    BgSky,
    BgFar,
    BgMid,
    BgNear,
}

impl TextureId {
    pub const ALL: &'static [TextureId] = &[
        TextureId::PlayerIdle,
        TextureId::PlayerRun,
        TextureId::PlayerJump,
        TextureId::PlayerSlide,
        TextureId::PlayerDie,
        TextureId::Stone,
        TextureId::Brick,
        TextureId::Grass,
        TextureId::Bush,
        TextureId::Fence,
        TextureId::Bullet,
        TextureId::BulletHit,
        TextureId::Spiny,
        TextureId::SpinyDead,
        TextureId::BgSky,
        TextureId::BgFar,
        TextureId::BgMid,
        TextureId::BgNear,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::PlayerIdle => "player_idle",
            Self::PlayerRun => "player_run",
            Self::PlayerJump => "player_jump",
            Self::PlayerSlide => "player_slide",
            Self::PlayerDie => "player_die",
            Self::Stone => "stone",
            Self::Brick => "brick",
            Self::Grass => "grass",
            Self::Bush => "bush",
            Self::Fence => "fence",
            Self::Bullet => "bullet",
            Self::BulletHit => "bullet_hit",
            Self::Spiny => "spiny",
            Self::SpinyDead => "spiny_dead",
            Self::BgSky => "bg_sky",
            Self::BgFar => "bg_far",
            Self::BgMid => "bg_mid",
            Self::BgNear => "bg_near",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    fn default_size(self) -> [f32; 2] {
        match self {
            Self::PlayerIdle | Self::PlayerJump | Self::PlayerSlide | Self::PlayerDie => {
                [32.0, 32.0]
            }
            Self::PlayerRun => [96.0, 32.0],
            Self::Stone | Self::Brick | Self::Grass | Self::Bush | Self::Fence => [32.0, 32.0],
            Self::Bullet => [32.0, 8.0],
            Self::BulletHit => [48.0, 16.0],
            Self::Spiny => [64.0, 32.0],
            Self::SpinyDead => [32.0, 32.0],
            Self::BgSky => [640.0, 480.0],
            Self::BgFar | Self::BgMid | Self::BgNear => [480.0, 280.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Clip {
    Idle,
    Run,
    Slide,
    Jump,
    Die,
    BulletMoving,
    BulletHit,
    EnemyWalk,
    EnemyDead,
}

impl Clip {
    pub const ALL: &'static [Clip] = &[
        Clip::Idle,
        Clip::Run,
        Clip::Slide,
        Clip::Jump,
        Clip::Die,
        Clip::BulletMoving,
        Clip::BulletHit,
        Clip::EnemyWalk,
        Clip::EnemyDead,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Run => "run",
            Self::Slide => "slide",
            Self::Jump => "jump",
            Self::Die => "die",
            Self::BulletMoving => "bullet_moving",
            Self::BulletHit => "bullet_hit",
            Self::EnemyWalk => "enemy_walk",
            Self::EnemyDead => "enemy_dead",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// Sprite sheet the clip plays from.
    pub fn texture(self) -> TextureId {
        match self {
            Self::Idle => TextureId::PlayerIdle,
            Self::Run => TextureId::PlayerRun,
            Self::Slide => TextureId::PlayerSlide,
            Self::Jump => TextureId::PlayerJump,
            Self::Die => TextureId::PlayerDie,
            Self::BulletMoving => TextureId::Bullet,
            Self::BulletHit => TextureId::BulletHit,
            Self::EnemyWalk => TextureId::Spiny,
            Self::EnemyDead => TextureId::SpinyDead,
        }
    }

    fn default_spec(self) -> ClipSpec {
        match self {
            Self::Idle => ClipSpec::new(1, 1600),
            Self::Run => ClipSpec::new(3, 300),
            Self::Slide | Self::Jump | Self::Die => ClipSpec::new(1, 1000),
            Self::BulletMoving => ClipSpec::new(4, 500),
            Self::BulletHit => ClipSpec::new(3, 500),
            Self::EnemyWalk => ClipSpec::new(2, 600),
            Self::EnemyDead => ClipSpec::new(1, 1000),
        }
    }
}

/// Overrides read from the tuning file, keyed by texture / clip name.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CatalogConfig {
    pub textures: BTreeMap<String, [f32; 2]>,
    pub clips: BTreeMap<String, ClipSpec>,
}

#[derive(Debug, Clone)]
pub struct SpriteCatalog {
    textures: BTreeMap<TextureId, [f32; 2]>,
    clips: BTreeMap<Clip, ClipSpec>,
}

impl SpriteCatalog {
    pub fn from_config(config: &CatalogConfig) -> Result<Self, String> {
        let mut catalog = Self::default();
        for (name, size) in &config.textures {
            let id = TextureId::from_name(name).ok_or_else(|| {
                format!("Catalog validation failed: unknown texture '{name}'")
            })?;
            if size[0] <= 0.0 || size[1] <= 0.0 {
                return Err(format!(
                    "Catalog validation failed: texture '{name}' has nonpositive size"
                ));
            }
            catalog.textures.insert(id, *size);
        }
        for (name, spec) in &config.clips {
            let clip = Clip::from_name(name)
                .ok_or_else(|| format!("Catalog validation failed: unknown clip '{name}'"))?;
            spec.validate(name)?;
            catalog.clips.insert(clip, *spec);
        }
        Ok(catalog)
    }

    pub fn texture_size(&self, id: TextureId) -> [f32; 2] {
        self.textures
            .get(&id)
            .copied()
            .unwrap_or_else(|| id.default_size())
    }

    /// Side of one square frame in the sheet.
    pub fn frame_side(&self, id: TextureId) -> f32 {
        self.texture_size(id)[1]
    }

    pub fn clip_spec(&self, clip: Clip) -> ClipSpec {
        self.clips
            .get(&clip)
            .copied()
            .unwrap_or_else(|| clip.default_spec())
    }

    /// Fresh (rewound) animation set holding `clips`, with `first` active.
    pub fn animation_set(&self, clips: &[Clip], first: Clip) -> AnimationSet<Clip> {
        let mut set = AnimationSet::new();
        for &clip in clips {
            set.insert(clip, Animation::from_spec(self.clip_spec(clip)));
        }
        set.play(first);
        set
    }
}

impl Default for SpriteCatalog {
    fn default() -> Self {
        Self {
            textures: TextureId::ALL
                .iter()
                .map(|&id| (id, id.default_size()))
                .collect(),
            clips: Clip::ALL
                .iter()
                .map(|&clip| (clip, clip.default_spec()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_for_every_id() {
        for &id in TextureId::ALL {
            assert_eq!(TextureId::from_name(id.name()), Some(id));
        }
        for &clip in Clip::ALL {
            assert_eq!(Clip::from_name(clip.name()), Some(clip));
        }
    }

    #[test]
    fn overrides_replace_defaults() {
        let mut config = CatalogConfig::default();
        config.textures.insert("bullet".to_string(), [40.0, 10.0]);
        config
            .clips
            .insert("run".to_string(), ClipSpec::new(6, 600));
        let catalog = SpriteCatalog::from_config(&config).expect("valid overrides");
        assert_eq!(catalog.frame_side(TextureId::Bullet), 10.0);
        assert_eq!(catalog.clip_spec(Clip::Run), ClipSpec::new(6, 600));
        // Untouched entries keep their defaults.
        assert_eq!(catalog.frame_side(TextureId::BulletHit), 16.0);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let mut config = CatalogConfig::default();
        config.textures.insert("lava".to_string(), [32.0, 32.0]);
        let err = SpriteCatalog::from_config(&config).expect_err("unknown texture");
        assert!(err.contains("unknown texture 'lava'"));

        let mut config = CatalogConfig::default();
        config.clips.insert("dance".to_string(), ClipSpec::new(1, 100));
        let err = SpriteCatalog::from_config(&config).expect_err("unknown clip");
        assert!(err.contains("unknown clip 'dance'"));
    }

    #[test]
    fn zero_duration_clip_is_rejected() {
        let mut config = CatalogConfig::default();
        config.clips.insert("idle".to_string(), ClipSpec::new(1, 0));
        let err = SpriteCatalog::from_config(&config).expect_err("zero duration");
        assert!(err.contains("zero duration"));
    }

    #[test]
    fn animation_set_starts_on_first_clip() {
        let catalog = SpriteCatalog::default();
        let set = catalog.animation_set(&[Clip::EnemyWalk, Clip::EnemyDead], Clip::EnemyWalk);
        assert_eq!(set.active(), Some(Clip::EnemyWalk));
        assert!(set.get(Clip::EnemyDead).is_some());
        assert!(set.get(Clip::Idle).is_none());
    }
}
