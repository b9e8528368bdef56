//! Prompt construction for the three request kinds sent to the LLM.
//!
//! - Narration: free text in three phases, closed by the verdict line
//! - Recommendation: strict JSON `{"choix": "<Nom>"}`
//! - Generation: strict JSON `{"pokemon": [...]}`
//!
//! The reply formats declared here are the contract `use_cases::response_parser`
//! reads back. Building a prompt never touches the network.

use serde_json::Value;

use pokearena_domain::{BatchSize, CharacterRecord, ElementType, GeneratedBatch, Terrain, BATCH_KEY};

use crate::infrastructure::ports::{ChatMessage, LlmRequest};

/// Token opening the last line of a narration.
pub const VERDICT_SENTINEL: &str = "VAINQUEUR";

/// Key of the recommendation reply object.
pub const CHOICE_KEY: &str = "choix";

/// System and user prompt for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

impl PromptPair {
    pub fn into_request(self) -> LlmRequest {
        LlmRequest::new(vec![ChatMessage::user(self.user)]).with_system_prompt(self.system)
    }
}

/// Fixed prompt texts.
pub mod defaults {
    /// Narrator role and hard rules. `{terrain}` and `{favoured}` are filled in
    /// per battle.
    pub const NARRATION_SYSTEM_PROMPT: &str = r#"Tu es un commentateur de combats de créatures, strictement neutre.

RÈGLES IMPÉRATIVES :
1. Reste neutre : ne favorise aucun combattant avant le dénouement.
2. Fonde l'issue du combat sur le Type, la Description, la Personnalité et les Stats de chaque combattant.
3. Le terrain modifie les chances de victoire : il avantage les types qui lui sont associés (par exemple, un Volcan avantage un type Feu).
   Terrain du combat : {terrain}. Types avantagés sur ce terrain : {favoured}.
4. Structure ton récit en exactement trois phases, chacune annoncée par son titre sur sa propre ligne :
   Début
   Tournant
   Fin
5. La dernière ligne de ta réponse doit être exactement :
   VAINQUEUR : <nom du vainqueur>
   en reprenant le nom exact d'un des deux combattants, sans aucun texte après."#;

    pub const RECOMMENDATION_SYSTEM_PROMPT: &str = r#"Tu es un expert en créatures qui aide un dresseur à choisir son compagnon.
On te fournit une liste de créatures au format JSON et la description de la personnalité du dresseur.
Choisis la créature dont le caractère correspond le mieux à cette personnalité.

Réponds UNIQUEMENT avec un objet JSON strict de la forme :
{"choix": "<Nom exact de la créature>"}
Aucun texte avant ou après, aucun bloc de code."#;

    /// `{count}` is filled in per request.
    pub const GENERATION_SYSTEM_PROMPT: &str = r#"Tu es un game designer qui invente des créatures originales.

Réponds UNIQUEMENT avec un objet JSON strict de la forme :
{"pokemon": [{"Nom": "...", "Type": "...", "Description": "...", "Personnalite": "...", "Stats": {"PV": 0, "Attaque": 0, "Defense": 0, "Vitesse": 0}}]}

La liste "pokemon" contient exactement {count} créatures.
Chaque nom est unique et inventé. Aucun texte en dehors du JSON."#;
}

/// Narration request for a validated matchup.
pub fn build_narration_prompt(
    champion: &CharacterRecord,
    adversary: &CharacterRecord,
    terrain: Terrain,
) -> PromptPair {
    let favoured = terrain
        .favoured_types()
        .iter()
        .map(ElementType::label)
        .collect::<Vec<_>>()
        .join(", ");

    let system = defaults::NARRATION_SYSTEM_PROMPT
        .replace("{terrain}", terrain.label())
        .replace("{favoured}", &favoured);

    let user = format!(
        "Terrain : {}\n\nChampion :\n{}\n\nAdversaire :\n{}\n\nRaconte le combat.",
        terrain.label(),
        champion.to_pretty_json(),
        adversary.to_pretty_json(),
    );

    PromptPair { system, user }
}

/// Recommendation request: the whole batch plus the user's own words.
pub fn build_recommendation_prompt(batch: &GeneratedBatch, user_description: &str) -> PromptPair {
    let records = Value::Array(
        batch
            .records()
            .iter()
            .map(|record| Value::Object(record.fields().clone()))
            .collect(),
    );

    let user = format!(
        "Créatures disponibles :\n{:#}\n\nPersonnalité du dresseur :\n{}",
        records, user_description
    );

    PromptPair {
        system: defaults::RECOMMENDATION_SYSTEM_PROMPT.to_string(),
        user,
    }
}

/// Generation request for `size` new records, optionally steered to one type.
pub fn build_generation_prompt(size: BatchSize, dominant_type: Option<ElementType>) -> PromptPair {
    let system = defaults::GENERATION_SYSTEM_PROMPT.replace("{count}", &size.get().to_string());

    let allowed = ElementType::all()
        .iter()
        .map(ElementType::label)
        .collect::<Vec<_>>()
        .join(", ");

    let steering = match dominant_type {
        Some(element) => format!(
            "Type dominant : {}. La majorité des créatures doivent être de ce type.",
            element.label()
        ),
        None => "Aucun type dominant : varie les types.".to_string(),
    };

    let user = format!(
        "Génère {} créatures sous la clé \"{}\".\n{}\nTypes autorisés : {}.",
        size.get(),
        BATCH_KEY,
        steering,
        allowed
    );

    PromptPair { system, user }
}
