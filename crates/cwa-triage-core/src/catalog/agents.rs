//! Agent directory: builtin sample agents or the remote agent list.

use tracing::debug;

use crate::error::{Fetched, TriageResult};
use crate::models::{Agent, AgentClass, MedicineDoses, RiskLevel};
use crate::remote::PredictionApi;

/// The known agents, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentDirectory {
    agents: Vec<Agent>,
}

impl Default for AgentDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AgentDirectory {
    /// Create a directory. Later agents with a duplicate name replace the
    /// earlier entry in place.
    pub fn new(agents: Vec<Agent>) -> Self {
        let mut directory = Self { agents: Vec::new() };
        for agent in agents {
            directory.insert(agent);
        }
        directory
    }

    /// The builtin sample directory.
    pub fn builtin() -> Self {
        Self::new(default_agents())
    }

    /// Directory of agents known only by name.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(Agent::new).collect())
    }

    /// Fetch the agent list from the prediction service.
    pub fn fetch(api: &dyn PredictionApi) -> TriageResult<Fetched<AgentDirectory>> {
        let names = api.get_all_agents()?;
        debug!(count = names.len(), "fetched remote agent list");
        Ok(Fetched::from_vec(names, Self::from_names))
    }

    /// Add an agent, replacing any agent of the same name.
    pub fn insert(&mut self, agent: Agent) {
        match self.agents.iter_mut().find(|a| a.name == agent.name) {
            Some(existing) => *existing = agent,
            None => self.agents.push(agent),
        }
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

fn agent(
    name: &str,
    classification: AgentClass,
    risk: RiskLevel,
    symptoms: &[&str],
    action: &str,
    protocol: &[&str],
    medicines: MedicineDoses,
) -> Agent {
    Agent {
        name: name.into(),
        classification: Some(classification),
        symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
        risk: Some(risk),
        action: Some(action.into()),
        protocol: protocol.iter().map(|s| s.to_string()).collect(),
        medicines,
    }
}

/// Initial doses keyed the way the prediction service keys them.
fn doses(
    atropine_mg: f64,
    pralidoxime_mg: f64,
    diazepam_mg: f64,
    hydroxocobalamin_g: f64,
    methylprednisolone_mg: f64,
    albuterol_neb_mg: f64,
    dimercaprol_mg: f64,
) -> MedicineDoses {
    MedicineDoses::new()
        .with("atropine_mg_initial", atropine_mg)
        .with("pralidoxime_mg_initial", pralidoxime_mg)
        .with("diazepam_mg_initial", diazepam_mg)
        .with("hydroxocobalamin_g_initial", hydroxocobalamin_g)
        .with("methylprednisolone_mg_initial", methylprednisolone_mg)
        .with("albuterol_neb_mg_initial", albuterol_neb_mg)
        .with("dimercaprol_BAL_mg_initial", dimercaprol_mg)
}

/// Default sample agents.
fn default_agents() -> Vec<Agent> {
    vec![
        // Nerve agents
        agent(
            "VX Nerve Agent",
            AgentClass::Chemical,
            RiskLevel::High,
            &["Blurred Vision", "Excessive Sweating", "Muscle Twitching"],
            "Administer atropine, decontaminate immediately.",
            &[
                "Remove the casualty from the contaminated area.",
                "Remove clothing and decontaminate skin with soap and water.",
                "Administer atropine and pralidoxime.",
                "Give diazepam for seizures.",
                "Provide airway support and ventilation as needed.",
            ],
            doses(2.0, 600.0, 10.0, 0.0, 0.0, 0.0, 0.0),
        ),
        agent(
            "Sarin",
            AgentClass::Chemical,
            RiskLevel::High,
            &[
                "Pinpoint Pupils",
                "Excessive Sweating",
                "Muscle Twitching",
                "Shortness of Breath",
                "Headache",
            ],
            "Administer atropine and pralidoxime, ventilate.",
            &[
                "Evacuate to fresh air.",
                "Remove clothing and flush exposed skin and eyes with water.",
                "Administer atropine and pralidoxime.",
                "Give diazepam for seizures.",
                "Monitor respiration; intubate if secretions compromise the airway.",
            ],
            doses(2.0, 600.0, 10.0, 0.0, 0.0, 0.0, 0.0),
        ),
        // Biological toxins
        agent(
            "Botulinum Toxin",
            AgentClass::Biological,
            RiskLevel::High,
            &["Nausea", "Blurred Vision"],
            "Administer antitoxin, provide respiratory support.",
            &[
                "Administer botulinum antitoxin as early as possible.",
                "Monitor vital capacity and provide mechanical ventilation if needed.",
                "Give supportive care for swallowing difficulty.",
            ],
            MedicineDoses::new(),
        ),
        // Blood agents
        agent(
            "Hydrogen Cyanide",
            AgentClass::Chemical,
            RiskLevel::High,
            &[
                "Headache",
                "Confusion",
                "Rapid Heart Rate",
                "Shortness of Breath",
                "Seizures",
            ],
            "Administer hydroxocobalamin, give 100% oxygen.",
            &[
                "Remove from exposure and give 100% oxygen.",
                "Administer hydroxocobalamin intravenously.",
                "Treat seizures and correct acidosis.",
            ],
            doses(0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0),
        ),
        // Vesicants
        agent(
            "Sulfur Mustard",
            AgentClass::Chemical,
            RiskLevel::High,
            &["Skin Irritation", "Blistering", "Eye Irritation", "Coughing"],
            "Decontaminate skin and eyes, provide supportive care.",
            &[
                "Decontaminate skin with soap and water within minutes.",
                "Irrigate eyes with water or saline.",
                "Dress blisters and manage as burns.",
                "Treat respiratory symptoms supportively.",
            ],
            MedicineDoses::new(),
        ),
        agent(
            "Lewisite",
            AgentClass::Chemical,
            RiskLevel::High,
            &["Skin Irritation", "Blistering", "Eye Irritation"],
            "Decontaminate, administer dimercaprol.",
            &[
                "Decontaminate skin and irrigate eyes immediately.",
                "Administer dimercaprol (BAL) intramuscularly.",
                "Manage blisters as burns.",
            ],
            doses(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 210.0),
        ),
        // Pulmonary agents
        agent(
            "Chlorine",
            AgentClass::Chemical,
            RiskLevel::Moderate,
            &[
                "Coughing",
                "Chest Tightness",
                "Shortness of Breath",
                "Eye Irritation",
            ],
            "Move to fresh air, give nebulized bronchodilator.",
            &[
                "Move to fresh air and keep the casualty at rest.",
                "Give humidified oxygen.",
                "Administer nebulized albuterol for bronchospasm.",
                "Consider corticosteroids for persistent wheeze.",
            ],
            doses(0.0, 0.0, 0.0, 0.0, 125.0, 2.5, 0.0),
        ),
        agent(
            "Phosgene",
            AgentClass::Chemical,
            RiskLevel::Moderate,
            &["Coughing", "Chest Tightness", "Shortness of Breath"],
            "Enforce rest, observe for delayed pulmonary edema.",
            &[
                "Remove from exposure and enforce strict rest.",
                "Observe for at least 24 hours for pulmonary edema.",
                "Give oxygen and corticosteroids as indicated.",
            ],
            doses(0.0, 0.0, 0.0, 0.0, 125.0, 0.0, 0.0),
        ),
    ]
}
