// ── sesame_server generator ──
//
// Turns a validated server block into the registration script. The
// algorithm is two-phase: the full trigger object graph is constructed
// and linked first, event-subsystem registration runs in a second pass
// once every sub-entity link exists.

use indexmap::IndexSet;

use sesamegen_config::{
    Document, EntityConfig, EventType, LockConfig, ServerConfig, validate_server,
};

use crate::error::CoreError;
use crate::ir::{CodegenUnit, EntityKind, Expr};

/// Component name in the configuration document.
pub const COMPONENT: &str = sesamegen_config::COMPONENT_NAME;

pub const DEPENDENCIES: &[&str] = &["event", "binary_sensor", "sensor", "text_sensor", "lock"];
pub const AUTO_LOAD: &[&str] = &["event", "binary_sensor", "sensor", "text_sensor", "lock"];
pub const CONFLICTS_WITH: &[&str] = &["esp32_ble"];

const SERVER_CLASS: &str = "sesame_server::SesameServerComponent";
const TRIGGER_CLASS: &str = "sesame_server::SesameTrigger";
const STATUS_LOCK_CLASS: &str = "sesame_server::StatusLock";
const TEXT_SENSOR_CLASS: &str = "text_sensor::TextSensor";
const SENSOR_CLASS: &str = "sensor::Sensor";
const BINARY_SENSOR_CLASS: &str = "binary_sensor::BinarySensor";

/// Device class of the connection sensor, fixed by the component.
pub const DEVICE_CLASS_CONNECTIVITY: &str = "connectivity";

const LIB_SERVER: (&str, Option<&str>, &str) = (
    "libsesame3bt-server",
    Some("v0.8.0"),
    "https://github.com/homy-newfs8/libsesame3bt-server",
);
const LIB_CORE: (&str, Option<&str>, &str) = (
    "libsesame3bt-core",
    None,
    "https://github.com/homy-newfs8/libsesame3bt-core",
);

// ── Identifier allocation ───────────────────────────────────────────

/// Allocates declaration identifiers. Configured ids are used verbatim
/// and must be unique; absent ids get deterministic stem-based defaults.
#[derive(Default)]
struct IdAllocator {
    used: IndexSet<String>,
}

impl IdAllocator {
    fn claim(&mut self, explicit: Option<&str>, stem: &str) -> Result<String, CoreError> {
        if let Some(id) = explicit {
            if self.used.insert(id.to_owned()) {
                return Ok(id.to_owned());
            }
            return Err(CoreError::DuplicateId { id: id.to_owned() });
        }
        if self.used.insert(stem.to_owned()) {
            return Ok(stem.to_owned());
        }
        let mut n = 2;
        loop {
            let candidate = format!("{stem}_{n}");
            if self.used.insert(candidate.clone()) {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

// ── Generation ──────────────────────────────────────────────────────

/// Registry entry point: extract the block, validate, emit.
pub fn generate(doc: &Document, out: &mut CodegenUnit) -> Result<(), CoreError> {
    let config = doc.server_config()?;
    validate_server(&config)?;
    generate_from_config(&config, out)
}

/// Emit the registration script for an already validated server block.
pub fn generate_from_config(config: &ServerConfig, out: &mut CodegenUnit) -> Result<(), CoreError> {
    let mut ids = IdAllocator::default();

    let server = ids.claim(config.id.as_deref(), "sesame_server_component")?;
    out.declare_var(
        &server,
        SERVER_CLASS,
        vec![
            Expr::Int(i64::from(config.max_sessions)),
            Expr::str(config.uuid.to_string()),
        ],
    );

    if let Some(lconf) = &config.lock {
        let lock = declare_status_lock(out, &mut ids, lconf, &server)?;
        out.adopt(&server, "set_lock_entity", vec![Expr::ident(lock)]);
    }

    if let Some(secret) = &config.secret {
        out.adopt(&server, "set_registered_secret", vec![Expr::str(secret.clone())]);
    }

    out.register_component(&server);

    // Phase one: construct the full trigger graph and link sub-entities.
    let mut constructed = Vec::with_capacity(config.triggers.len());
    for (index, tconf) in config.triggers.iter().enumerate() {
        let stem = format!("sesame_trigger_{}", index + 1);
        let trigger = ids.claim(tconf.id.as_deref(), &stem)?;

        // Optionals normalize to empty strings, never null.
        let address = tconf.address.as_ref().map(|a| a.as_str().to_owned()).unwrap_or_default();
        let uuid = tconf.uuid.map(|u| u.to_string()).unwrap_or_default();
        out.declare_var(
            &trigger,
            TRIGGER_CLASS,
            vec![
                Expr::ident(server.clone()),
                Expr::Str(address),
                Expr::Str(uuid),
            ],
        );
        if let Some(name) = &tconf.name {
            out.adopt(&trigger, "set_name", vec![Expr::str(name.clone())]);
        }

        if let Some(sconf) = &tconf.history_tag {
            let sensor = declare_entity(
                out,
                &mut ids,
                sconf,
                EntityKind::TextSensor,
                TEXT_SENSOR_CLASS,
                "history_tag_sensor",
            )?;
            out.adopt(&trigger, "set_history_tag_sensor", vec![Expr::ident(sensor)]);
        }

        if let Some(sconf) = &tconf.trigger_type {
            let sensor = declare_entity(
                out,
                &mut ids,
                sconf,
                EntityKind::Sensor,
                SENSOR_CLASS,
                "trigger_type_sensor",
            )?;
            out.adopt(&trigger, "set_trigger_type_sensor", vec![Expr::ident(sensor)]);
        }

        if let Some(lconf) = &tconf.lock {
            let lock = declare_status_lock(out, &mut ids, lconf, &trigger)?;
            out.adopt(&trigger, "set_lock_entity", vec![Expr::ident(lock)]);
        }

        if let Some(bconf) = &tconf.connection_sensor {
            let sensor = declare_entity(
                out,
                &mut ids,
                bconf,
                EntityKind::BinarySensor,
                BINARY_SENSOR_CLASS,
                "connection_sensor",
            )?;
            out.adopt(
                &sensor,
                "set_device_class",
                vec![Expr::str(DEVICE_CLASS_CONNECTIVITY)],
            );
            out.adopt(&trigger, "set_connection_sensor", vec![Expr::ident(sensor)]);
        }

        out.adopt(&server, "add_trigger", vec![Expr::ident(trigger.clone())]);
        constructed.push((trigger, tconf));
    }

    // Phase two: event registration, after all sub-entity links exist.
    for (trigger, tconf) in constructed {
        let types = tconf
            .event_types
            .clone()
            .unwrap_or_else(|| EventType::ALL.to_vec());
        out.register_event(&trigger, types.iter().map(ToString::to_string).collect());
    }

    out.add_library(LIB_SERVER.0, LIB_SERVER.1, LIB_SERVER.2);
    out.add_library(LIB_CORE.0, LIB_CORE.1, LIB_CORE.2);
    out.add_build_option("lib_ldf_mode", "deep");
    Ok(())
}

fn declare_status_lock(
    out: &mut CodegenUnit,
    ids: &mut IdAllocator,
    lconf: &LockConfig,
    parent: &str,
) -> Result<String, CoreError> {
    let lock = ids.claim(lconf.id.as_deref(), "status_lock")?;
    out.declare_var(&lock, STATUS_LOCK_CLASS, vec![Expr::ident(parent)]);
    if let Some(name) = &lconf.name {
        out.adopt(&lock, "set_name", vec![Expr::str(name.clone())]);
    }
    out.register_entity(EntityKind::Lock, &lock);
    Ok(lock)
}

fn declare_entity(
    out: &mut CodegenUnit,
    ids: &mut IdAllocator,
    econf: &EntityConfig,
    kind: EntityKind,
    class: &str,
    stem: &str,
) -> Result<String, CoreError> {
    let id = ids.claim(econf.id.as_deref(), stem)?;
    out.declare_var(&id, class, vec![]);
    if let Some(name) = &econf.name {
        out.adopt(&id, "set_name", vec![Expr::str(name.clone())]);
    }
    if let Some(icon) = &econf.icon {
        out.adopt(&id, "set_icon", vec![Expr::str(icon.clone())]);
    }
    if econf.disabled_by_default {
        out.adopt(&id, "set_disabled_by_default", vec![Expr::Bool(true)]);
    }
    out.register_entity(kind, &id);
    Ok(id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ir::Statement;

    fn unit_for(yaml: &str) -> CodegenUnit {
        let doc = Document::from_yaml(yaml).unwrap();
        let mut out = CodegenUnit::new();
        generate(&doc, &mut out).unwrap();
        out
    }

    const SERVER_UUID: &str = "1845efbc-0afc-11e9-8eb4-0002a5d5c51b";
    const TRIGGER_UUID: &str = "2845efbc-0afc-11e9-8eb4-0002a5d5c51c";

    #[test]
    fn zero_triggers_still_declares_the_server() {
        let unit = unit_for(&format!("sesame_server:\n  uuid: {SERVER_UUID}\n"));
        assert!(matches!(
            &unit.statements[0],
            Statement::DeclareVar { id, class, args }
                if id == "sesame_server_component"
                    && class == SERVER_CLASS
                    && args == &vec![Expr::Int(3), Expr::str(SERVER_UUID)]
        ));
        assert!(unit.statements.iter().any(|s| matches!(
            s,
            Statement::RegisterComponent { id } if id == "sesame_server_component"
        )));
        assert!(!unit
            .statements
            .iter()
            .any(|s| matches!(s, Statement::RegisterEvent { .. })));
    }

    #[test]
    fn end_to_end_scenario() {
        let unit = unit_for(&format!(
            "sesame_server:\n\
             \x20 uuid: {SERVER_UUID}\n\
             \x20 max_sessions: 5\n\
             \x20 triggers:\n\
             \x20   - uuid: {TRIGGER_UUID}\n\
             \x20     trigger_type:\n\
             \x20       name: Trigger Type\n"
        ));

        // One server object carrying max_sessions = 5.
        assert!(matches!(
            &unit.statements[0],
            Statement::DeclareVar { class, args, .. }
                if class == SERVER_CLASS && args[0] == Expr::Int(5)
        ));

        // One trigger with empty address string and the given uuid.
        let trigger_args = unit
            .statements
            .iter()
            .find_map(|s| match s {
                Statement::DeclareVar { class, args, .. } if class == TRIGGER_CLASS => Some(args),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            trigger_args,
            &vec![
                Expr::ident("sesame_server_component"),
                Expr::str(""),
                Expr::str(TRIGGER_UUID),
            ]
        );

        // A numeric sensor declared, registered, and linked to the trigger.
        assert!(unit.statements.iter().any(|s| matches!(
            s,
            Statement::RegisterEntity { kind: EntityKind::Sensor, id } if id == "trigger_type_sensor"
        )));
        assert!(unit.statements.iter().any(|s| matches!(
            s,
            Statement::Adopt { method, .. } if method == "set_trigger_type_sensor"
        )));

        // Registered for all four event types.
        let event_types = unit
            .statements
            .iter()
            .find_map(|s| match s {
                Statement::RegisterEvent { event_types, .. } => Some(event_types.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(event_types, vec!["open", "close", "lock", "unlock"]);
    }

    #[test]
    fn construction_completes_before_event_registration() {
        let unit = unit_for(&format!(
            "sesame_server:\n\
             \x20 uuid: {SERVER_UUID}\n\
             \x20 triggers:\n\
             \x20   - uuid: {TRIGGER_UUID}\n\
             \x20     lock:\n\
             \x20       name: Lock A\n\
             \x20   - address: aa:bb:cc:dd:ee:ff\n\
             \x20     connection_sensor:\n\
             \x20       name: Connected B\n"
        ));
        let last_adopt = unit
            .statements
            .iter()
            .rposition(|s| matches!(s, Statement::Adopt { .. }))
            .unwrap();
        let first_event = unit
            .statements
            .iter()
            .position(|s| matches!(s, Statement::RegisterEvent { .. }))
            .unwrap();
        assert!(last_adopt < first_event, "event registration interleaved with construction");
    }

    #[test]
    fn server_lock_is_registered_and_linked() {
        let unit = unit_for(&format!(
            "sesame_server:\n\
             \x20 uuid: {SERVER_UUID}\n\
             \x20 lock:\n\
             \x20   name: Server Lock\n"
        ));
        assert!(unit.statements.iter().any(|s| matches!(
            s,
            Statement::DeclareVar { class, args, .. }
                if class == STATUS_LOCK_CLASS && args == &vec![Expr::ident("sesame_server_component")]
        )));
        assert!(unit.statements.iter().any(|s| matches!(
            s,
            Statement::RegisterEntity { kind: EntityKind::Lock, .. }
        )));
        assert!(unit.statements.iter().any(|s| matches!(
            s,
            Statement::Adopt { target, method, .. }
                if target == "sesame_server_component" && method == "set_lock_entity"
        )));
    }

    #[test]
    fn connection_sensor_gets_connectivity_device_class() {
        let unit = unit_for(&format!(
            "sesame_server:\n\
             \x20 uuid: {SERVER_UUID}\n\
             \x20 triggers:\n\
             \x20   - uuid: {TRIGGER_UUID}\n\
             \x20     connection_sensor:\n\
             \x20       name: Connected\n"
        ));
        assert!(unit.statements.iter().any(|s| matches!(
            s,
            Statement::Adopt { target, method, args }
                if target == "connection_sensor"
                    && method == "set_device_class"
                    && args == &vec![Expr::str("connectivity")]
        )));
    }

    #[test]
    fn deprecated_server_address_never_reaches_the_script() {
        let with_address = unit_for(&format!(
            "sesame_server:\n  uuid: {SERVER_UUID}\n  address: \"01:02:03:04:05:06\"\n"
        ));
        let without_address = unit_for(&format!("sesame_server:\n  uuid: {SERVER_UUID}\n"));
        assert_eq!(with_address.statements, without_address.statements);
    }

    #[test]
    fn secret_emits_setter() {
        let unit = unit_for(&format!(
            "sesame_server:\n\
             \x20 uuid: {SERVER_UUID}\n\
             \x20 secret: \"0123456789abcdef0123456789abcdef\"\n"
        ));
        assert!(unit.statements.iter().any(|s| matches!(
            s,
            Statement::Adopt { method, args, .. }
                if method == "set_registered_secret"
                    && args == &vec![Expr::str("0123456789abcdef0123456789abcdef")]
        )));
    }

    #[test]
    fn event_types_subset_is_respected() {
        let unit = unit_for(&format!(
            "sesame_server:\n\
             \x20 uuid: {SERVER_UUID}\n\
             \x20 triggers:\n\
             \x20   - uuid: {TRIGGER_UUID}\n\
             \x20     event_types: [lock, unlock]\n"
        ));
        let event_types = unit
            .statements
            .iter()
            .find_map(|s| match s {
                Statement::RegisterEvent { event_types, .. } => Some(event_types.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(event_types, vec!["lock", "unlock"]);
    }

    #[test]
    fn duplicate_explicit_ids_fail() {
        let doc = Document::from_yaml(&format!(
            "sesame_server:\n\
             \x20 uuid: {SERVER_UUID}\n\
             \x20 triggers:\n\
             \x20   - id: trig\n\
             \x20     uuid: {TRIGGER_UUID}\n\
             \x20   - id: trig\n\
             \x20     address: aa:bb:cc:dd:ee:ff\n"
        ))
        .unwrap();
        let mut out = CodegenUnit::new();
        let err = generate(&doc, &mut out).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateId { .. }));
    }

    #[test]
    fn libraries_and_ldf_mode_are_always_declared() {
        let unit = unit_for(&format!("sesame_server:\n  uuid: {SERVER_UUID}\n"));
        let names: Vec<&str> = unit.libraries.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["libsesame3bt-server", "libsesame3bt-core"]);
        assert_eq!(
            unit.build_options.get("lib_ldf_mode").map(String::as_str),
            Some("deep")
        );
    }

    #[test]
    fn invalid_trigger_aborts_before_any_emission() {
        let doc = Document::from_yaml(&format!(
            "sesame_server:\n\
             \x20 uuid: {SERVER_UUID}\n\
             \x20 triggers:\n\
             \x20   - name: No Addressing\n"
        ))
        .unwrap();
        let mut out = CodegenUnit::new();
        assert!(generate(&doc, &mut out).is_err());
        assert!(out.statements.is_empty(), "partial graph leaked");
    }
}
