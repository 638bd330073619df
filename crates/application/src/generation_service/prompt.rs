use std::fmt::Write;

use itinero_domain::{Budget, Interest, Pace, TripRequest};

use super::GenerationPrompt;

/// Fixed instructions for every generation call: strict JSON only, French
/// text, euro prices, and the exact output schema the response validator
/// expects.
const SYSTEM_PROMPT: &str = r#"Tu es un expert en planification de voyages. Tu produis des itinéraires personnalisés, détaillés et réalistes.

RÈGLES :
1. Réponds UNIQUEMENT avec un objet JSON valide, sans texte avant ou après
2. Tous les textes sont en français
3. Les estimations de prix sont en euros
4. Les horaires utilisent le format "HH:MM" ou une mention descriptive ("Matin", "Après-midi")
5. Reste réaliste sur les temps de trajet et les horaires d'ouverture
6. Privilégie les adresses locales et authentiques plutôt que les seuls spots touristiques
7. Adapte les activités au budget et au rythme demandés

FORMAT DE RÉPONSE (JSON strict) :
{
  "destination": "Ville, Pays",
  "days": [
    {
      "day": 1,
      "date": "YYYY-MM-DD (optionnel)",
      "theme": "Titre de la journée",
      "activities": [
        {
          "time": "09:00",
          "title": "Nom de l'activité",
          "description": "Description détaillée",
          "location": "Adresse ou quartier",
          "duration": "2h (optionnel)",
          "costEstimate": "10-15€",
          "tips": "Conseil pratique (optionnel)"
        }
      ],
      "meals": {
        "breakfast": { "name": "Nom du lieu", "type": "Type de cuisine", "costEstimate": "5-10€" },
        "lunch": { "name": "...", "type": "...", "costEstimate": "..." },
        "dinner": { "name": "...", "type": "...", "costEstimate": "..." }
      },
      "accommodation": {
        "name": "Nom de l'hébergement",
        "type": "hôtel, auberge, ...",
        "priceRange": "50-80€/nuit",
        "neighborhood": "Quartier (optionnel)"
      },
      "transportTip": "Conseil transport du jour (optionnel)"
    }
  ],
  "budgetSummary": {
    "accommodation": "XXX-XXX€",
    "food": "XXX-XXX€",
    "activities": "XXX-XXX€",
    "transport": "XXX-XXX€",
    "total": "XXX-XXX€"
  },
  "tips": ["Conseil général 1", "Conseil général 2"],
  "bestTimeToVisit": "Meilleure période pour visiter (optionnel)",
  "packingEssentials": ["Élément 1", "Élément 2"]
}

Chaque journée contient entre 1 et 8 activités."#;

/// Builds the prompt pair for one validated request.
pub(super) fn build_prompt(request: &TripRequest) -> GenerationPrompt {
    GenerationPrompt {
        system: SYSTEM_PROMPT.to_owned(),
        user: build_user_prompt(request),
    }
}

fn build_user_prompt(request: &TripRequest) -> String {
    let travelers = request.travelers.unwrap_or(1);
    let interests = request
        .interests
        .iter()
        .map(|interest| interest_label(*interest))
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = format!(
        "Génère un itinéraire de voyage complet pour :\n\n\
         DESTINATION : {destination}\n\
         DURÉE : {days} jour{day_plural}\n\
         VOYAGEURS : {travelers} personne{traveler_plural}\n\
         BUDGET : {budget}\n\
         RYTHME : {pace}\n\
         CENTRES D'INTÉRÊT : {interests}",
        destination = request.destination,
        days = request.days,
        day_plural = if request.days > 1 { "s" } else { "" },
        travelers = travelers,
        traveler_plural = if travelers > 1 { "s" } else { "" },
        budget = budget_label(request.budget),
        pace = pace_label(request.pace),
        interests = interests,
    );

    if let Some(start_date) = request.start_date.as_deref() {
        let _ = write!(prompt, "\nDATE DE DÉPART : {start_date}");
    }

    let _ = write!(
        prompt,
        "\n\nCONSIGNES :\n\
         - Propose des activités variées correspondant aux intérêts mentionnés\n\
         - Recommande un hébergement pour chaque nuit et des restaurants locaux pour chaque repas\n\
         - Adapte le nombre d'activités au rythme demandé\n\
         - Le budget total couvre hébergement, repas, activités et transport local\n\n\
         Réponds avec le JSON complet de l'itinéraire."
    );

    prompt
}

fn budget_label(budget: Budget) -> &'static str {
    match budget {
        Budget::Economic => "économique (petit budget, auberges, street food)",
        Budget::Balanced => "équilibré (bon rapport qualité-prix)",
        Budget::Comfort => "confort (hôtels 4 étoiles, bons restaurants)",
    }
}

fn pace_label(pace: Pace) -> &'static str {
    match pace {
        Pace::Relaxed => "tranquille (2-3 activités par jour, temps libre)",
        Pace::Balanced => "équilibré (4-5 activités par jour)",
        Pace::Intense => "intense (journées bien remplies)",
    }
}

fn interest_label(interest: Interest) -> &'static str {
    match interest {
        Interest::Culture => "culture et musées",
        Interest::Nature => "nature et randonnées",
        Interest::Gastronomie => "gastronomie et cuisine locale",
        Interest::Histoire => "sites historiques et patrimoine",
        Interest::Plage => "plages et activités nautiques",
        Interest::Aventure => "aventure et adrénaline",
        Interest::Shopping => "shopping et marchés",
        Interest::Relaxation => "spa et détente",
        Interest::Insolite => "expériences hors des sentiers battus",
        Interest::Sport => "sport et activités physiques",
        Interest::VieNocturne => "vie nocturne et bars",
        Interest::Famille => "activités familiales",
    }
}

#[cfg(test)]
mod tests {
    use itinero_domain::{Budget, Interest, Pace, TripRequest};

    use super::build_prompt;

    fn request() -> TripRequest {
        TripRequest {
            destination: "Lisbonne".to_owned(),
            days: 3,
            budget: Budget::Economic,
            interests: vec![Interest::Culture, Interest::Plage],
            pace: Pace::Relaxed,
            travelers: Some(2),
            start_date: Some("2026-09-01".to_owned()),
        }
    }

    #[test]
    fn user_prompt_interpolates_request_fields() {
        let prompt = build_prompt(&request());

        assert!(prompt.user.contains("DESTINATION : Lisbonne"));
        assert!(prompt.user.contains("DURÉE : 3 jours"));
        assert!(prompt.user.contains("VOYAGEURS : 2 personnes"));
        assert!(prompt.user.contains("économique"));
        assert!(prompt.user.contains("tranquille"));
        assert!(prompt.user.contains("culture et musées, plages et activités nautiques"));
        assert!(prompt.user.contains("DATE DE DÉPART : 2026-09-01"));
    }

    #[test]
    fn start_date_line_is_omitted_when_absent() {
        let mut request = request();
        request.start_date = None;

        let prompt = build_prompt(&request);
        assert!(!prompt.user.contains("DATE DE DÉPART"));
    }

    #[test]
    fn singular_day_drops_the_plural() {
        let mut request = request();
        request.days = 1;
        request.travelers = None;

        let prompt = build_prompt(&request);
        assert!(prompt.user.contains("DURÉE : 1 jour\n"));
        assert!(prompt.user.contains("VOYAGEURS : 1 personne\n"));
    }

    #[test]
    fn system_prompt_pins_the_output_schema() {
        let prompt = build_prompt(&request());

        assert!(prompt.system.contains("JSON"));
        assert!(prompt.system.contains("budgetSummary"));
        assert!(prompt.system.contains("costEstimate"));
        assert!(prompt.system.contains("entre 1 et 8 activités"));
    }
}
