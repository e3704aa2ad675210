//! Prompt template banks for the naming and categorizing tasks.
//!
//! Templates are plain data: order, count and wording are tunable without
//! touching the orchestrator. Each template has a single `{content}`
//! substitution point; optional extra context is appended to every
//! template in a bank before rendering.

/// An ordered set of alternative prompt wordings for one task.
#[derive(Debug, Clone)]
pub struct PromptBank {
    templates: Vec<String>,
}

impl PromptBank {
    pub fn new(templates: Vec<String>) -> Self {
        Self { templates }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Append extra context verbatim to every template in the bank.
    pub fn with_extra_context(mut self, extra: &str) -> Self {
        for template in &mut self.templates {
            template.push_str(&format!("\nKontext: {extra}"));
        }
        self
    }

    /// Render template `index` with the document text substituted in.
    pub fn render(&self, index: usize, content: &str) -> String {
        self.templates[index].replace("{content}", content)
    }
}

/// The three German naming templates, ordered from strict format rules to
/// a role-playing variant. Diversity across templates is what makes the
/// retry loop productive.
pub fn naming_bank() -> PromptBank {
    PromptBank::new(vec![
        r#"Analysiere den folgenden Text aus einem PDF-Dokument und erstelle einen präzisen deutschen Dateinamen.

REGELN:
- Format: Dokumenttyp_Firma_Thema_Datum.pdf
- Verwende Unterstriche statt Leerzeichen
- Inkludiere: Dokumenttyp (z.B. Rechnung, Vertrag, Angebot), Firmennamen, relevante Details, Datum falls vorhanden
- Maximal 60 Zeichen
- Keine Sonderzeichen außer Unterstriche und Bindestriche
- Antworte NUR mit dem Dateinamen, keine Erklärungen

Text des Dokuments:
{content}

Dateiname:"#
            .to_string(),
        r#"Erstelle einen strukturierten Dateinamen für dieses PDF-Dokument.

FORMAT: [Typ]_[Firma]_[Details]_[YYYY-MM-DD].pdf

BEISPIELE:
- Rechnung_TelekomAG_Mobilfunk_2024-03-15.pdf
- Arbeitsvertrag_MusterGmbH_Schmidt_2023-01-10.pdf
- Kontoauszug_Sparkasse_Dezember2023.pdf

Gib NUR den Dateinamen aus, nichts anderes.

Dokumentinhalt:
{content}"#
            .to_string(),
        r#"Du bist ein Dokumenten-Management-System. Erstelle einen eindeutigen, präzisen Dateinamen.

WICHTIG:
1. Identifiziere Dokumenttyp (Rechnung, Brief, Vertrag, etc.)
2. Extrahiere Firmennamen oder Absender
3. Finde Datum falls vorhanden (Format: YYYY-MM-DD)
4. Füge relevante Details hinzu
5. Verwende Format: Typ_Firma_Details_Datum.pdf

NUR DEN DATEINAMEN AUSGEBEN!

Text:
{content}"#
            .to_string(),
    ])
}

/// The three German categorizing templates, parameterized by the allowed
/// label set so config changes never touch this module's callers.
pub fn categorizing_bank(labels: &[String]) -> PromptBank {
    let bullet_list = labels
        .iter()
        .map(|cat| format!("- {cat}"))
        .collect::<Vec<_>>()
        .join("\n");
    let numbered_list = labels
        .iter()
        .enumerate()
        .map(|(idx, cat)| format!("{}. {cat}", idx + 1))
        .collect::<Vec<_>>()
        .join("\n");
    let piped_list = labels.join(" | ");

    PromptBank::new(vec![
        format!(
            r#"Analysiere den folgenden Dokumententext und ordne ihn EXAKT EINER Kategorie zu.

ERLAUBTE KATEGORIEN:
{bullet_list}

REGELN:
1. Antworte NUR mit einer Kategorie aus der obigen Liste
2. Keine Erklärungen, keine zusätzlichen Worte
3. Wähle "Unsicher" nur wenn wirklich keine Kategorie passt
4. Achte auf Schlüsselwörter: Rechnungsnummer → Rechnung, Vertragslaufzeit → Vertrag, etc.

BEISPIELE:
- Text enthält "Rechnung Nr." → Antwort: Rechnung
- Text enthält "Arbeitsvertrag" → Antwort: Vertrag
- Text über Stromrechnung → Antwort: Rechnung

Dokumententext:
{{content}}

Kategorie:"#
        ),
        format!(
            r#"Du bist ein Dokumenten-Klassifizierungssystem. Klassifiziere dieses Dokument.

VERFÜGBARE KATEGORIEN:
{numbered_list}

WICHTIG: Gib NUR die exakte Kategorie aus der Liste aus, sonst nichts!

Text:
{{content}}

Zugewiesene Kategorie:"#
        ),
        format!(
            r#"Klassifiziere diesen Dokumententext in genau eine Kategorie.

Kategorien: {piped_list}

Hinweise zur Zuordnung:
- Rechnungen: enthalten Rechnungsnummer, Zahlungsbetrag, Fälligkeit
- Verträge: enthalten Vertragslaufzeit, Unterschriften, rechtliche Klauseln
- Briefe: persönliche/geschäftliche Korrespondenz ohne Rechnung
- Kontoauszüge: Transaktionsübersichten, IBAN, Kontobewegungen
- Wähle "Unsicher" nur wenn gar keine Kategorie passt (< 50% Sicherheit)

ANTWORTE NUR MIT EINER KATEGORIE!

Text:
{{content}}"#
        ),
    ])
}
