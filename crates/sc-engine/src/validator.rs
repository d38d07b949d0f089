use crate::*;

/// Read-only view over one authored child while it is being checked.
struct ChildContext<'a> {
    raw: &'a RawChild,
    parent: &'a UserAgentDefinition,
    versions: &'a [String],
}

impl ChildContext<'_> {
    fn user_agent(&self) -> &str {
        &self.parent.user_agent
    }

    fn has(&self, key: &str) -> bool {
        self.raw.contains_key(key)
    }

    fn child_json(&self) -> String {
        JsonValue::Object(self.raw.clone()).to_string()
    }

    /// Only meaningful once the match checks have passed.
    fn match_template(&self) -> &str {
        self.raw
            .get("match")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
    }

    fn string_list(&self, key: &str) -> Option<Vec<String>> {
        self.raw.get(key).and_then(string_list)
    }

    fn properties(&self) -> Option<&JsonMap<String, JsonValue>> {
        self.raw.get("properties").and_then(JsonValue::as_object)
    }
}

type ChildCheck = fn(&ChildContext<'_>) -> Result<(), DefinitionError>;

/// Evaluated top to bottom; the first failure wins. Later checks rely on the
/// earlier ones having passed.
const CHILD_CHECKS: &[ChildCheck] = &[
    check_device_exclusivity,
    check_devices_shape,
    check_device_shape,
    check_match_present,
    check_match_is_string,
    check_match_characters,
    check_platform_placeholder,
    check_platforms_shape,
    check_platforms_need_placeholder,
    check_version_placeholder,
    check_versions_need_placeholder,
    check_device_placeholder,
    check_devices_need_placeholder,
    check_properties_shape,
    check_parent_property,
    check_version_property,
    check_scope_guards,
    check_engine_shape,
];

/// Validates one authored child against its family and returns the typed child.
pub fn validate_child(
    raw: &RawChild,
    parent: &UserAgentDefinition,
    versions: &[String],
) -> Result<ChildDefinition, DefinitionError> {
    let context = ChildContext {
        raw,
        parent,
        versions,
    };

    for check in CHILD_CHECKS {
        check(&context)?;
    }

    Ok(typed_child(&context))
}

fn typed_child(context: &ChildContext<'_>) -> ChildDefinition {
    let devices = context
        .string_list("devices")
        .or_else(|| {
            context
                .raw
                .get("device")
                .and_then(JsonValue::as_str)
                .map(|device| vec![device.to_string()])
        });

    ChildDefinition {
        match_template: context.match_template().to_string(),
        devices,
        platforms: context.string_list("platforms"),
        properties: context
            .properties()
            .map(properties_from_json)
            .unwrap_or_default(),
        engine: context
            .raw
            .get("engine")
            .and_then(JsonValue::as_str)
            .map(str::to_string),
    }
}

fn string_list(value: &JsonValue) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|entry| entry.as_str().map(str::to_string))
        .collect()
}

fn properties_from_json(properties: &JsonMap<String, JsonValue>) -> PropertyMap {
    properties
        .iter()
        .filter_map(|(key, value)| {
            property_value_from_json(value).map(|value| (key.clone(), value))
        })
        .collect()
}

fn invalid_match_chars_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"[\[\]]").expect("invalid match chars regex"))
}

fn check_device_exclusivity(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    if context.has("device") && context.has("devices") {
        return Err(DefinitionError::conflict(
            "CHILD_DEVICE_AND_DEVICES",
            format!(
                "a child may not define both the \"device\" and the \"devices\" entries for key \"{}\", for child data: {}",
                context.user_agent(),
                context.child_json()
            ),
        ));
    }
    Ok(())
}

fn check_devices_shape(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    if context.has("devices") && context.string_list("devices").is_none() {
        return Err(DefinitionError::malformed(
            "CHILD_DEVICES_NOT_ARRAY",
            format!(
                "the \"devices\" entry has to be an array of strings for key \"{}\", for child data: {}",
                context.user_agent(),
                context.child_json()
            ),
        ));
    }
    Ok(())
}

fn check_device_shape(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    if context.raw.get("device").is_some_and(|device| !device.is_string()) {
        return Err(DefinitionError::malformed(
            "CHILD_DEVICE_NOT_STRING",
            format!(
                "the \"device\" entry has to be a string for key \"{}\", for child data: {}",
                context.user_agent(),
                context.child_json()
            ),
        ));
    }
    Ok(())
}

fn check_match_present(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    if !context.has("match") {
        return Err(DefinitionError::malformed(
            "CHILD_MATCH_MISSING",
            format!(
                "each child requires a \"match\" entry for key \"{}\", missing for child data: {}",
                context.user_agent(),
                context.child_json()
            ),
        ));
    }
    Ok(())
}

fn check_match_is_string(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    if context.raw.get("match").is_some_and(|value| !value.is_string()) {
        return Err(DefinitionError::malformed(
            "CHILD_MATCH_NOT_STRING",
            format!(
                "the \"match\" entry for key \"{}\" has to be a string for child data: {}",
                context.user_agent(),
                context.child_json()
            ),
        ));
    }
    Ok(())
}

fn check_match_characters(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    let template = context.match_template();
    if invalid_match_chars_regex().is_match(template) {
        return Err(DefinitionError::malformed(
            "CHILD_MATCH_INVALID_CHARS",
            format!("key \"{}\" includes invalid characters", template),
        ));
    }
    Ok(())
}

fn check_platform_placeholder(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    let template = context.match_template();
    if template.contains(PLATFORM_PLACEHOLDER) && !context.has("platforms") {
        return Err(DefinitionError::conflict(
            "CHILD_PLATFORM_PLACEHOLDER_WITHOUT_PLATFORMS",
            format!(
                "the key \"{}\" is defined with platform placeholder, but no platforms are assigned",
                template
            ),
        ));
    }
    Ok(())
}

fn check_platforms_shape(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    if context.has("platforms") && context.string_list("platforms").is_none() {
        return Err(DefinitionError::malformed(
            "CHILD_PLATFORMS_NOT_ARRAY",
            format!(
                "the \"platforms\" entry for key \"{}\" has to be an array of strings for child data: {}",
                context.user_agent(),
                context.child_json()
            ),
        ));
    }
    Ok(())
}

fn check_platforms_need_placeholder(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    let platforms = context.string_list("platforms").unwrap_or_default();
    if platforms.len() > 1 && !context.match_template().contains(PLATFORM_PLACEHOLDER) {
        return Err(DefinitionError::conflict(
            "CHILD_PLATFORMS_WITHOUT_PLACEHOLDER",
            format!(
                "the \"platforms\" entry contains multiple platforms but there is no #PLATFORM# token for key \"{}\", for child data: {}",
                context.user_agent(),
                context.child_json()
            ),
        ));
    }
    Ok(())
}

fn check_version_placeholder(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    let template = context.match_template();
    if has_version_placeholder(template) && is_sentinel_versions(context.versions) {
        return Err(DefinitionError::conflict(
            "CHILD_VERSION_PLACEHOLDER_WITHOUT_VERSIONS",
            format!(
                "the key \"{}\" is defined with version placeholders, but no versions are set",
                template
            ),
        ));
    }
    Ok(())
}

fn check_versions_need_placeholder(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    let template = context.match_template();
    if has_version_placeholder(template)
        || is_sentinel_versions(context.versions)
        || context.versions.len() <= 1
    {
        return Ok(());
    }

    // Per-platform version resolution happens outside this engine for "dynamic" platforms.
    let has_dynamic_platform = context
        .string_list("platforms")
        .unwrap_or_default()
        .iter()
        .any(|platform| platform.to_lowercase().contains("dynamic"));
    if has_dynamic_platform {
        return Ok(());
    }

    Err(DefinitionError::conflict(
        "CHILD_VERSIONS_WITHOUT_PLACEHOLDER",
        format!(
            "the key \"{}\" is defined without version placeholders, but there are versions set",
            template
        ),
    ))
}

fn check_device_placeholder(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    let template = context.match_template();
    if template.contains(DEVICE_PLACEHOLDER) && !context.has("devices") && !context.has("device")
    {
        return Err(DefinitionError::conflict(
            "CHILD_DEVICE_PLACEHOLDER_WITHOUT_DEVICES",
            format!(
                "the key \"{}\" is defined with device placeholder, but no devices are assigned",
                template
            ),
        ));
    }
    Ok(())
}

fn check_devices_need_placeholder(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    let devices = context.string_list("devices").unwrap_or_default();
    if devices.len() > 1 && !context.match_template().contains(DEVICE_PLACEHOLDER) {
        return Err(DefinitionError::conflict(
            "CHILD_DEVICES_WITHOUT_PLACEHOLDER",
            format!(
                "the \"devices\" entry contains multiple devices but there is no #DEVICE# token for key \"{}\", for child data: {}",
                context.user_agent(),
                context.child_json()
            ),
        ));
    }
    Ok(())
}

fn check_properties_shape(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    let Some(value) = context.raw.get("properties") else {
        return Ok(());
    };

    let well_formed = value.as_object().is_some_and(|properties| {
        properties
            .values()
            .all(|value| property_value_from_json(value).is_some())
    });
    if !well_formed {
        return Err(DefinitionError::malformed(
            "CHILD_PROPERTIES_NOT_OBJECT",
            format!(
                "the properties entry has to be an object of scalar values for key \"{}\"",
                context.match_template()
            ),
        ));
    }
    Ok(())
}

fn check_parent_property(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    if context
        .properties()
        .is_some_and(|properties| properties.contains_key("Parent"))
    {
        return Err(DefinitionError::conflict(
            "CHILD_PARENT_PROPERTY",
            format!(
                "the Parent property must not be set inside the children array for key \"{}\"",
                context.match_template()
            ),
        ));
    }
    Ok(())
}

/// Compares coerced values, the form family properties are stored in.
fn check_version_property(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    let child_version = context
        .properties()
        .and_then(|properties| properties.get("Version"))
        .and_then(property_value_from_json);
    let Some(child_version) = child_version else {
        return Ok(());
    };

    if context.parent.properties.get("Version") == Some(&child_version) {
        return Err(DefinitionError::conflict(
            "CHILD_VERSION_DUPLICATE",
            format!(
                "the \"Version\" property is set for key \"{}\", but was already set for its parent \"{}\"",
                context.match_template(),
                context.user_agent()
            ),
        ));
    }
    Ok(())
}

fn check_scope_guards(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    let Some(properties) = context.properties() else {
        return Ok(());
    };

    for scope in Scope::ALL {
        let message = format!(
            "the properties array contains {} data for key \"{}\", {}",
            scope.catalog_kind(),
            context.match_template(),
            scope.reference_hint()
        );
        scope.check(properties.keys().map(String::as_str), &message)?;
    }
    Ok(())
}

fn check_engine_shape(context: &ChildContext<'_>) -> Result<(), DefinitionError> {
    if context.raw.get("engine").is_some_and(|engine| !engine.is_string()) {
        return Err(DefinitionError::malformed(
            "CHILD_ENGINE_NOT_STRING",
            format!(
                "the \"engine\" entry has to be a string for key \"{}\", for child data: {}",
                context.user_agent(),
                context.child_json()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod validator_tests {
    use super::*;
    use crate::engine_test_support::*;
    use serde_json::json;

    #[test]
    fn valid_child_is_returned_typed() {
        let parent = family("Foo", &["1.0", "2.0"]);
        let child = validate_child(
            &raw(json!({
                "match": "Foo #PLATFORM# #MAJORVER#.#MINORVER#",
                "platforms": ["WinXP", "Win7"],
                "device": "Windows Desktop",
                "engine": "Trident",
                "properties": {"isMobileDevice": "false", "Comment": " Foo "}
            })),
            &parent,
            &parent.versions,
        )
        .expect("child should validate");

        assert_eq!(child.match_template, "Foo #PLATFORM# #MAJORVER#.#MINORVER#");
        assert_eq!(child.platforms, Some(strings(&["WinXP", "Win7"])));
        assert_eq!(child.devices, Some(strings(&["Windows Desktop"])));
        assert_eq!(child.engine.as_deref(), Some("Trident"));
        assert_eq!(
            child.properties.get("isMobileDevice"),
            Some(&PropertyValue::Bool(false))
        );
        assert_eq!(
            child.properties.get("Comment"),
            Some(&PropertyValue::from("Foo"))
        );
    }

    #[test]
    fn device_and_devices_together_conflict_before_anything_else() {
        let parent = family("Foo", &[]);
        // match is missing too; exclusivity is reported first.
        let error = validate_child(
            &raw(json!({"device": "a", "devices": ["b"]})),
            &parent,
            &parent.versions,
        )
        .expect_err("device + devices should fail");
        assert_eq!(error.code, "CHILD_DEVICE_AND_DEVICES");
        assert_eq!(error.kind, ErrorKind::DefinitionConflict);
        assert!(error.message.contains("\"Foo\""));
        assert!(error.message.contains("\"devices\":[\"b\"]"));
    }

    #[test]
    fn shape_errors_are_malformed() {
        let parent = family("Foo", &[]);
        let cases = [
            (json!({"match": "x", "devices": "a"}), "CHILD_DEVICES_NOT_ARRAY"),
            (json!({"match": "x", "devices": [1]}), "CHILD_DEVICES_NOT_ARRAY"),
            (json!({"match": "x", "device": ["a"]}), "CHILD_DEVICE_NOT_STRING"),
            (json!({"platforms": ["a"]}), "CHILD_MATCH_MISSING"),
            (json!({"match": 5}), "CHILD_MATCH_NOT_STRING"),
            (json!({"match": "Foo [x]"}), "CHILD_MATCH_INVALID_CHARS"),
            (json!({"match": "Foo]"}), "CHILD_MATCH_INVALID_CHARS"),
            (json!({"match": "x", "platforms": "WinXP"}), "CHILD_PLATFORMS_NOT_ARRAY"),
            (json!({"match": "x", "properties": ["a"]}), "CHILD_PROPERTIES_NOT_OBJECT"),
            (
                json!({"match": "x", "properties": {"a": {"b": 1}}}),
                "CHILD_PROPERTIES_NOT_OBJECT",
            ),
            (json!({"match": "x", "engine": 3}), "CHILD_ENGINE_NOT_STRING"),
        ];

        for (child, code) in cases {
            let error = validate_child(&raw(child.clone()), &parent, &parent.versions)
                .expect_err("malformed child should fail");
            assert_eq!(error.code, code, "child: {}", child);
            assert_eq!(error.kind, ErrorKind::MalformedDefinition, "child: {}", child);
        }
    }

    #[test]
    fn platform_placeholder_and_platform_count_must_agree() {
        let parent = family("Foo", &[]);

        let missing = validate_child(
            &raw(json!({"match": "Foo #PLATFORM#"})),
            &parent,
            &parent.versions,
        )
        .expect_err("placeholder without platforms");
        assert_eq!(missing.code, "CHILD_PLATFORM_PLACEHOLDER_WITHOUT_PLATFORMS");

        let many = validate_child(
            &raw(json!({"match": "Foo", "platforms": ["WinXP", "Win7"]})),
            &parent,
            &parent.versions,
        )
        .expect_err("many platforms without placeholder");
        assert_eq!(many.code, "CHILD_PLATFORMS_WITHOUT_PLACEHOLDER");
        assert_eq!(many.kind, ErrorKind::DefinitionConflict);

        assert!(validate_child(
            &raw(json!({"match": "Foo", "platforms": ["WinXP"]})),
            &parent,
            &parent.versions,
        )
        .is_ok());
    }

    #[test]
    fn device_placeholder_and_device_count_must_agree() {
        let parent = family("Foo", &[]);

        let missing = validate_child(
            &raw(json!({"match": "Foo #DEVICE#"})),
            &parent,
            &parent.versions,
        )
        .expect_err("placeholder without devices");
        assert_eq!(missing.code, "CHILD_DEVICE_PLACEHOLDER_WITHOUT_DEVICES");

        let many = validate_child(
            &raw(json!({"match": "Foo", "devices": ["a", "b"]})),
            &parent,
            &parent.versions,
        )
        .expect_err("many devices without placeholder");
        assert_eq!(many.code, "CHILD_DEVICES_WITHOUT_PLACEHOLDER");
        assert_eq!(many.kind, ErrorKind::DefinitionConflict);

        assert!(validate_child(
            &raw(json!({"match": "Foo #DEVICE#", "device": "a"})),
            &parent,
            &parent.versions,
        )
        .is_ok());
        assert!(validate_child(
            &raw(json!({"match": "Foo #DEVICE#", "devices": ["a", "b"]})),
            &parent,
            &parent.versions,
        )
        .is_ok());
    }

    #[test]
    fn version_placeholder_requires_real_versions() {
        let parent = family("Foo", &[]);
        for template in ["Foo #MAJORVER#", "Foo #MINORVER#"] {
            let error = validate_child(
                &raw(json!({ "match": template })),
                &parent,
                &parent.versions,
            )
            .expect_err("sentinel versions should fail");
            assert_eq!(error.code, "CHILD_VERSION_PLACEHOLDER_WITHOUT_VERSIONS");
            assert_eq!(error.kind, ErrorKind::DefinitionConflict);
        }
    }

    #[test]
    fn empty_version_list_behaves_like_sentinel() {
        let mut parent = family("Bar", &[]);
        parent.versions = Vec::new();

        let error = validate_child(
            &raw(json!({"match": "Bar #MAJORVER#"})),
            &parent,
            &parent.versions,
        )
        .expect_err("empty versions should fail");
        assert_eq!(error.code, "CHILD_VERSION_PLACEHOLDER_WITHOUT_VERSIONS");

        let plain = raw(json!({"match": "Bar"}));
        assert!(validate_child(&plain, &parent, &parent.versions).is_ok());
    }

    #[test]
    fn multiple_versions_require_placeholder_or_dynamic_platform() {
        let parent = family("Foo", &["1.0", "2.0"]);

        let bare = validate_child(&raw(json!({"match": "Foo"})), &parent, &parent.versions)
            .expect_err("no placeholder and no platforms");
        assert_eq!(bare.code, "CHILD_VERSIONS_WITHOUT_PLACEHOLDER");

        let static_platform = validate_child(
            &raw(json!({"match": "Foo", "platforms": ["Win7"]})),
            &parent,
            &parent.versions,
        )
        .expect_err("static platform is no escape hatch");
        assert_eq!(static_platform.code, "CHILD_VERSIONS_WITHOUT_PLACEHOLDER");

        assert!(validate_child(
            &raw(json!({"match": "Foo", "platforms": ["Android_Dynamic"]})),
            &parent,
            &parent.versions,
        )
        .is_ok());

        let single = family("Bar", &["3.0"]);
        assert!(validate_child(&raw(json!({"match": "Bar"})), &single, &single.versions).is_ok());
    }

    #[test]
    fn properties_overlay_rejects_parent_and_duplicate_version() {
        let mut parent = family("Foo", &[]);
        parent
            .properties
            .insert("Version".to_string(), PropertyValue::from("1.0"));

        let with_parent = validate_child(
            &raw(json!({"match": "Foo", "properties": {"Parent": "Bar"}})),
            &parent,
            &parent.versions,
        )
        .expect_err("Parent key");
        assert_eq!(with_parent.code, "CHILD_PARENT_PROPERTY");

        let same_version = validate_child(
            &raw(json!({"match": "Foo", "properties": {"Version": "1.0"}})),
            &parent,
            &parent.versions,
        )
        .expect_err("duplicate Version");
        assert_eq!(same_version.code, "CHILD_VERSION_DUPLICATE");
        assert!(same_version.message.contains("\"Foo\""));

        assert!(validate_child(
            &raw(json!({"match": "Foo", "properties": {"Version": "2.0"}})),
            &parent,
            &parent.versions,
        )
        .is_ok());
    }

    #[test]
    fn duplicate_version_compares_coerced_values() {
        let mut parent = family("Foo", &[]);
        parent
            .properties
            .insert("Version".to_string(), PropertyValue::from("1.0"));

        for version in [json!(1.0), json!(" 1.0 ")] {
            let error = validate_child(
                &raw(json!({"match": "Foo", "properties": {"Version": version}})),
                &parent,
                &parent.versions,
            )
            .expect_err("same Version after coercion");
            assert_eq!(error.code, "CHILD_VERSION_DUPLICATE");
        }

        assert!(validate_child(
            &raw(json!({"match": "Foo", "properties": {"Version": "1.00"}})),
            &parent,
            &parent.versions,
        )
        .is_ok());
    }

    #[test]
    fn scope_guards_run_in_platform_engine_device_order() {
        let parent = family("Foo", &[]);

        let platform = validate_child(
            &raw(json!({"match": "Foo", "properties": {"Platform_Bits": "64"}})),
            &parent,
            &parent.versions,
        )
        .expect_err("platform key");
        assert_eq!(platform.code, "CHILD_PLATFORM_SCOPE");
        assert_eq!(platform.kind, ErrorKind::DefinitionConflict);
        assert!(platform.message.contains("key \"Foo\""));
        assert!(platform.message.contains("\"platforms\""));

        let all_three = validate_child(
            &raw(json!({"match": "Foo", "properties": {
                "Device_Name": "x",
                "RenderingEngine_Name": "y",
                "Win64": true
            }})),
            &parent,
            &parent.versions,
        )
        .expect_err("platform guard runs first");
        assert_eq!(all_three.code, "CHILD_PLATFORM_SCOPE");

        let engine_and_device = validate_child(
            &raw(json!({"match": "Foo", "properties": {
                "Device_Name": "x",
                "RenderingEngine_Name": "y"
            }})),
            &parent,
            &parent.versions,
        )
        .expect_err("engine guard runs before device guard");
        assert_eq!(engine_and_device.code, "CHILD_ENGINE_SCOPE");

        let device = validate_child(
            &raw(json!({"match": "Foo", "properties": {"Device_Type": "Tablet"}})),
            &parent,
            &parent.versions,
        )
        .expect_err("device key");
        assert_eq!(device.code, "CHILD_DEVICE_SCOPE");
    }

    #[test]
    fn validation_is_independent_between_siblings() {
        let parent = family("Foo", &[]);
        let bad = raw(json!({"match": "Foo [x]"}));
        let good = raw(json!({"match": "Foo"}));

        assert!(validate_child(&bad, &parent, &parent.versions).is_err());
        assert!(validate_child(&good, &parent, &parent.versions).is_ok());
        assert!(validate_child(&bad, &parent, &parent.versions).is_err());
    }
}
