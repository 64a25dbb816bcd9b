//! Structures de l'enveloppe SOAP

use xmltree::Element;

/// Enveloppe SOAP complète
#[derive(Debug, Clone)]
pub struct SoapEnvelope {
    /// Corps SOAP contenant la réponse ou le fault
    pub body: SoapBody,
}

/// Corps SOAP
#[derive(Debug, Clone)]
pub struct SoapBody {
    /// Contenu XML brut du corps
    pub content: Element,
}

impl SoapEnvelope {
    /// Premier élément du corps (réponse d'action ou `Fault`)
    pub fn body_child(&self) -> Option<&Element> {
        self.body.content.children.iter().find_map(|n| n.as_element())
    }

    /// Vrai si le corps porte un `Fault`
    pub fn is_fault(&self) -> bool {
        self.body_child()
            .is_some_and(|elem| elem.name.ends_with("Fault"))
    }
}
