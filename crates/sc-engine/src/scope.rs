use crate::*;

const PLATFORM_KEYS: &[&str] = &[
    "Platform",
    "Platform_Description",
    "Platform_Maker",
    "Platform_Bits",
    "Platform_Version",
    "Win16",
    "Win32",
    "Win64",
    "Browser_Bits",
];

const ENGINE_KEYS: &[&str] = &[
    "RenderingEngine_Name",
    "RenderingEngine_Version",
    "RenderingEngine_Maker",
    "RenderingEngine_Description",
];

const DEVICE_KEYS: &[&str] = &[
    "Device_Name",
    "Device_Maker",
    "Device_Type",
    "Device_Pointing_Method",
    "Device_Code_Name",
    "Device_Brand_Name",
];

/// An inheritance axis whose identity properties may only come from its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Platform,
    Engine,
    Device,
}

impl Scope {
    /// Guard order used by the child validator.
    pub const ALL: [Scope; 3] = [Scope::Platform, Scope::Engine, Scope::Device];

    pub const fn reserved_keys(self) -> &'static [&'static str] {
        match self {
            Self::Platform => PLATFORM_KEYS,
            Self::Engine => ENGINE_KEYS,
            Self::Device => DEVICE_KEYS,
        }
    }

    pub fn is_reserved(self, key: &str) -> bool {
        self.reserved_keys().contains(&key)
    }

    pub fn error_code(self) -> &'static str {
        match self {
            Self::Platform => "CHILD_PLATFORM_SCOPE",
            Self::Engine => "CHILD_ENGINE_SCOPE",
            Self::Device => "CHILD_DEVICE_SCOPE",
        }
    }

    /// The reference field an author should use instead of inlining the keys.
    pub fn reference_hint(self) -> &'static str {
        match self {
            Self::Platform => "please use the \"platforms\" keyword",
            Self::Engine => "please use the \"engine\" keyword",
            Self::Device => "please use the \"device\" or the \"devices\" keyword",
        }
    }

    pub fn catalog_kind(self) -> CatalogKind {
        match self {
            Self::Platform => CatalogKind::Platform,
            Self::Engine => CatalogKind::Engine,
            Self::Device => CatalogKind::Device,
        }
    }

    /// Rejects `keys` if any of them belongs to this scope.
    pub fn check<'a, I>(self, keys: I, message: &str) -> Result<(), DefinitionError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if keys.into_iter().any(|key| self.is_reserved(key)) {
            return Err(DefinitionError::conflict(self.error_code(), message));
        }
        Ok(())
    }

    /// Copies the keys of `properties` that this scope owns, in their original order.
    pub fn identity_subset(self, properties: &PropertyMap) -> PropertyMap {
        properties
            .iter()
            .filter(|(key, _)| self.is_reserved(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
