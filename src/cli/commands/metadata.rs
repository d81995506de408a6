//! Implementation of the schema and application metadata commands.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::{CommandOutput, detail_table, table};
use crate::domain::models::{ApplicationInfo, Choice, FieldDefinition};
use crate::domain::ports::IncidentService;

#[derive(Args, Debug)]
pub struct ChoicesArgs {
    /// Field names to fetch choices for
    #[arg(required = true, value_delimiter = ',')]
    pub fields: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AppInfoOutput {
    pub base_url: String,
    #[serde(flatten)]
    pub application: ApplicationInfo,
}

impl CommandOutput for AppInfoOutput {
    fn to_human(&self) -> String {
        detail_table([
            ("Instance", self.base_url.clone()),
            ("Application", self.application.name.clone()),
            ("Scope", self.application.scope.clone()),
            ("Version", self.application.version.clone()),
        ])
        .to_string()
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct FieldsOutput {
    pub fields: Vec<FieldDefinition>,
}

impl CommandOutput for FieldsOutput {
    fn to_human(&self) -> String {
        if self.fields.is_empty() {
            return "No fields found.".to_string();
        }

        let mut t = table(["Element", "Label", "Mandatory", "Max length"]);
        for field in &self.fields {
            t.add_row(vec![
                field.element.as_str(),
                field.column_label.as_str(),
                field.mandatory.as_str(),
                field.max_length.as_str(),
            ]);
        }
        t.to_string()
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ChoicesOutput {
    pub choices: Vec<Choice>,
}

impl CommandOutput for ChoicesOutput {
    fn to_human(&self) -> String {
        if self.choices.is_empty() {
            return "No choices found.".to_string();
        }

        let mut t = table(["Element", "Value", "Label", "Dependent value"]);
        for choice in &self.choices {
            t.add_row(vec![
                choice.element.as_str(),
                choice.value.as_str(),
                choice.label.as_str(),
                choice.dependent_value.as_str(),
            ]);
        }
        t.to_string()
    }
}

pub async fn app_info(service: &dyn IncidentService) -> Result<AppInfoOutput> {
    let application = service.get_application_info().await?;
    Ok(AppInfoOutput {
        base_url: service.base_url().to_string(),
        application,
    })
}

pub async fn fields(service: &dyn IncidentService) -> Result<FieldsOutput> {
    let fields = service.get_fields().await?;
    Ok(FieldsOutput { fields })
}

pub async fn choices(service: &dyn IncidentService, args: ChoicesArgs) -> Result<ChoicesOutput> {
    let choices = service.get_choices(&args.fields).await?;
    Ok(ChoicesOutput { choices })
}
