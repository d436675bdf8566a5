//! A small demo scene: a few host objects with commands, some free
//! functions and a named-item catalog. The CLI drives it, and the
//! integration tests use it as their host.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{ConsoleConfig, ConsoleSetup};
use crate::model::{EnumDef, ParamType, Value};
use crate::objects::{NamedObject, ObjectCatalog};
use crate::registry::{CommandHost, HostCommands, MemberTable, StaticTable};

/// Lines written by demo commands, shared between every object.
#[derive(Debug, Clone, Default)]
pub struct OutputLog(Arc<Mutex<Vec<String>>>);

impl OutputLog {
    pub fn push(&self, line: impl Into<String>) {
        self.0.lock().push(line.into());
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Return and forget everything logged so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock())
    }
}

// ── Host objects ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LightState {
    pub intensity: f64,
    pub color: [f32; 3],
    pub enabled: bool,
}

pub struct Light {
    pub name: String,
    state: Mutex<LightState>,
    log: OutputLog,
}

impl Light {
    pub fn new(name: impl Into<String>, log: OutputLog) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(LightState {
                intensity: 1.0,
                color: [1.0, 1.0, 1.0],
                enabled: true,
            }),
            log,
        }
    }

    pub fn state(&self) -> LightState {
        self.state.lock().clone()
    }
}

impl CommandHost for Light {
    fn declare_commands(table: &mut MemberTable<Self>) {
        table
            .method("SetIntensity", |light, args| {
                let value = args.float(0)?;
                light.state.lock().intensity = value;
                light.log.push(format!("{}: intensity {value}", light.name));
                Ok(())
            })
            .param("intensity", ParamType::FLOAT);
        table
            .method("SetColor", |light, args| {
                let color = args.vec3(0)?;
                light.state.lock().color = color;
                light.log.push(format!("{}: color {color:?}", light.name));
                Ok(())
            })
            .param("rgb", ParamType::VEC3);
        table.field("LightEnabled", ParamType::Bool, |light, value| {
            let enabled = value.as_bool().ok_or("expected a bool")?;
            light.state.lock().enabled = enabled;
            light.log.push(format!("{}: enabled {enabled}", light.name));
            Ok(())
        });
        table.event("Flash", |light| {
            light.log.push(format!("{}: flash", light.name));
        });
    }
}

pub struct Item {
    pub name: String,
    pub weight: u32,
}

/// Largest count a single `Spawn` accepts.
pub const MAX_SPAWN: i64 = 100;

pub struct Spawner {
    log: OutputLog,
    spawned: Mutex<Vec<String>>,
}

impl Spawner {
    pub fn new(log: OutputLog) -> Self {
        Self {
            log,
            spawned: Mutex::new(Vec::new()),
        }
    }

    pub fn spawned(&self) -> Vec<String> {
        self.spawned.lock().clone()
    }

    fn creature_type() -> ParamType {
        ParamType::enumeration(EnumDef::new(
            "Creature",
            ["Goblin", "GoblinKing", "Slime", "Dragon"],
        ))
    }
}

impl CommandHost for Spawner {
    fn declare_commands(table: &mut MemberTable<Self>) {
        table
            .method("Spawn", |spawner, args| {
                let creature = args.enumeration(0)?;
                let count = args.int(1)?;
                if !(1..=MAX_SPAWN).contains(&count) {
                    return Err(format!("count must be between 1 and {MAX_SPAWN}").into());
                }
                for _ in 0..count {
                    spawner.spawned.lock().push(creature.name.clone());
                }
                spawner.log.push(format!("spawned {count} x {}", creature.name));
                Ok(())
            })
            .param("creature", Self::creature_type())
            .param_with_default("count", ParamType::INT, Value::Int(1));
        table
            .method("Equip", |spawner, args| {
                let item = args.object_as::<Item>(0)?;
                spawner
                    .log
                    .push(format!("equipped {} ({} kg)", item.name, item.weight));
                Ok(())
            })
            .param("item", ParamType::object("Item"));
    }
}

// ── Free functions ──────────────────────────────────────────────

fn static_commands(log: &OutputLog) -> StaticTable {
    let mut table = StaticTable::new("devconsole::demo");

    let out = log.clone();
    table
        .function("Echo", move |args| {
            out.push(args.text(0)?);
            Ok(())
        })
        .param("message", ParamType::Text);

    let out = log.clone();
    table
        .function("Add", move |args| {
            let sum = args.int(0)? + args.int(1)?;
            out.push(sum.to_string());
            Ok(())
        })
        .param("a", ParamType::INT)
        .param("b", ParamType::INT);

    let out = log.clone();
    table.function("Load", move |_| {
        out.push("loading");
        Ok(())
    });

    let out = log.clone();
    table
        .function("LoadScene", move |args| {
            out.push(format!("loading scene {}", args.text(0)?));
            Ok(())
        })
        .param("scene", ParamType::Text);

    let out = log.clone();
    table
        .function("ReloadAll", move |_| {
            out.push("reloading everything");
            Ok(())
        })
        .display_name("Reload");

    table
}

fn item_catalog() -> ObjectCatalog {
    [("Fire Sword", 4, "Weapon"), ("Iron Shield", 7, "Armor"), ("Health Potion", 1, "Consumable")]
        .into_iter()
        .fold(ObjectCatalog::new(), |catalog, (name, weight, kind)| {
            let item = Arc::new(Item {
                name: name.to_string(),
                weight,
            });
            catalog.with(NamedObject::new(name, item, [kind, "Item"]))
        })
}

// ── Scene ───────────────────────────────────────────────────────

/// The demo host: owns the live objects and the candidate source that
/// tracks them.
pub struct DemoScene {
    pub log: OutputLog,
    pub source: Arc<HostCommands>,
    pub lights: Vec<Arc<Light>>,
    pub spawner: Arc<Spawner>,
}

impl DemoScene {
    /// A scene with two lights and one spawner.
    pub fn new() -> Self {
        let log = OutputLog::default();
        let source = Arc::new(HostCommands::new().with_statics(static_commands(&log)));
        let spawner = Arc::new(Spawner::new(log.clone()));
        source.track(&spawner);
        let mut scene = Self {
            log,
            source,
            lights: Vec::new(),
            spawner,
        };
        scene.add_light("Key");
        scene.add_light("Fill");
        scene
    }

    pub fn add_light(&mut self, name: &str) -> Arc<Light> {
        let light = Arc::new(Light::new(name, self.log.clone()));
        self.source.track(&light);
        self.lights.push(Arc::clone(&light));
        light
    }

    /// Drop the scene's handle to a light. Returns whether one was found.
    pub fn remove_light(&mut self, name: &str) -> bool {
        let before = self.lights.len();
        self.lights.retain(|l| l.name != name);
        self.lights.len() != before
    }

    pub fn catalog(&self) -> ObjectCatalog {
        item_catalog()
    }

    /// Console setup over this scene with in-memory stores.
    pub fn setup(&self, config: ConsoleConfig) -> ConsoleSetup {
        ConsoleSetup::new(config, Arc::clone(&self.source) as _).with_objects(self.catalog())
    }
}

impl Default for DemoScene {
    fn default() -> Self {
        Self::new()
    }
}
