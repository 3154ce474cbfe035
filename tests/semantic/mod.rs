mod tests_aliases;
mod tests_conformance;
mod tests_features;
mod tests_imports;
mod tests_linking;
mod tests_scopes;
mod tests_workspace;
