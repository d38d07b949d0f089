use crate::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Stop at the first failing family instead of collecting every diagnostic.
    pub fail_fast: bool,
}

/// One authoring defect, located by family key (or catalog name) and child position.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub subject: String,
    pub child_index: Option<usize>,
    pub error: DefinitionError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOutcome {
    pub records: Vec<ConcreteRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildOutcome {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Validates every child of `family` independently. All failures are reported.
pub fn validate_family(
    family: &UserAgentDefinition,
) -> Result<Vec<ChildDefinition>, Vec<Diagnostic>> {
    let mut children = Vec::with_capacity(family.children.len());
    let mut diagnostics = Vec::new();

    for (index, raw) in family.children.iter().enumerate() {
        match validate_child(raw, family, &family.versions) {
            Ok(child) => children.push(child),
            Err(error) => diagnostics.push(Diagnostic {
                subject: family.user_agent.clone(),
                child_index: Some(index),
                error,
            }),
        }
    }

    if diagnostics.is_empty() {
        Ok(children)
    } else {
        Err(diagnostics)
    }
}

/// Validate-all, then expand and merge every child of one family.
pub fn build_family(
    family: &UserAgentDefinition,
    catalogs: &ResolvedCatalogs,
) -> Result<Vec<ConcreteRecord>, DefinitionError> {
    let children = validate_family(family).map_err(|diagnostics| {
        diagnostics
            .into_iter()
            .next()
            .map(|diagnostic| diagnostic.error)
            .unwrap_or_else(|| {
                DefinitionError::malformed("FAMILY_INVALID", family.user_agent.clone())
            })
    })?;

    let records = expand_family(family, &children, catalogs)?;
    ensure_unique_matches(&records, &mut HashSet::new())?;
    Ok(records)
}

fn expand_family(
    family: &UserAgentDefinition,
    children: &[ChildDefinition],
    catalogs: &ResolvedCatalogs,
) -> Result<Vec<ConcreteRecord>, DefinitionError> {
    let mut expanded = Vec::new();
    for (index, child) in children.iter().enumerate() {
        let origin = ChildOrigin {
            user_agent: family.user_agent.clone(),
            child_index: index,
        };
        expanded.extend(expand(child, &origin, family, catalogs, &family.versions)?);
    }

    let mut records = Vec::with_capacity(expanded.len());
    for ExpandedRecord {
        record,
        combination,
    } in expanded
    {
        let chain = AncestorChain::for_combination(family, &combination, catalogs)?;
        records.push(materialize(record, &chain));
    }
    Ok(records)
}

fn ensure_unique_matches(
    records: &[ConcreteRecord],
    seen: &mut HashSet<String>,
) -> Result<(), DefinitionError> {
    let mut local = HashSet::new();
    for record in records {
        if seen.contains(&record.match_string) || !local.insert(record.match_string.as_str()) {
            return Err(DefinitionError::conflict(
                "RECORD_DUPLICATE",
                format!(
                    "the key \"{}\" generated by \"{}\" is already defined",
                    record.match_string, record.source_child.user_agent
                ),
            ));
        }
    }
    seen.extend(records.iter().map(|record| record.match_string.clone()));
    Ok(())
}

/// Runs the whole catalog. Families are processed in order; a failing family
/// contributes diagnostics and no records.
pub fn build_catalog(
    families: &[UserAgentDefinition],
    catalogs: &Catalogs,
    options: BuildOptions,
) -> BuildOutcome {
    let mut outcome = BuildOutcome::default();

    let resolved = match resolve_catalogs(catalogs) {
        Ok(resolved) => resolved,
        Err(error) => {
            tracing::warn!(code = %error.code, "{}", error.message);
            outcome.diagnostics.push(Diagnostic {
                subject: "catalogs".to_string(),
                child_index: None,
                error,
            });
            return outcome;
        }
    };

    let mut seen = HashSet::new();
    for family in families {
        tracing::debug!(
            user_agent = %family.user_agent,
            children = family.children.len(),
            "building family"
        );

        let result = validate_family(family).and_then(|children| {
            expand_family(family, &children, &resolved)
                .and_then(|records| ensure_unique_matches(&records, &mut seen).map(|_| records))
                .map_err(|error| {
                    vec![Diagnostic {
                        subject: family.user_agent.clone(),
                        child_index: None,
                        error,
                    }]
                })
        });

        match result {
            Ok(records) => outcome.records.extend(records),
            Err(diagnostics) => {
                for diagnostic in &diagnostics {
                    tracing::warn!(
                        user_agent = %diagnostic.subject,
                        child = ?diagnostic.child_index,
                        code = %diagnostic.error.code,
                        "{}",
                        diagnostic.error.message
                    );
                }
                outcome.diagnostics.extend(diagnostics);
                if options.fail_fast {
                    break;
                }
            }
        }
    }

    tracing::info!(
        families = families.len(),
        records = outcome.records.len(),
        diagnostics = outcome.diagnostics.len(),
        "catalog build finished"
    );
    outcome
}
