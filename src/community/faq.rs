//! Static FAQ content.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const FAQ: &[FaqEntry] = &[
    FaqEntry {
        question: "What is ADITI Token?",
        answer: "ADITI Token (ADT) is a decentralized cryptocurrency designed for fast, secure, and low-cost transactions. It's built on the Ethereum blockchain and aims to revolutionize digital payments.",
    },
    FaqEntry {
        question: "How do I buy ADITI Tokens?",
        answer: "You can purchase ADITI Tokens through our DApp using MetaMask or other Web3 wallets. Simply connect your wallet, select the amount you want to purchase, and complete the transaction.",
    },
    FaqEntry {
        question: "What is the total supply of ADITI Tokens?",
        answer: "The total supply of ADITI Tokens is capped at 1,000,000 ADT. This limited supply helps maintain the token's value and scarcity.",
    },
    FaqEntry {
        question: "How do I store my ADITI Tokens?",
        answer: "ADITI Tokens can be stored in any ERC-20 compatible wallet like MetaMask, Trust Wallet, or Ledger. Always ensure you keep your private keys secure and never share them with anyone.",
    },
    FaqEntry {
        question: "What are the transaction fees?",
        answer: "ADITI Token transactions incur a 2% fee, which is distributed to token holders and used for platform development and maintenance.",
    },
    FaqEntry {
        question: "Is ADITI Token audited?",
        answer: "Yes, ADITI Token's smart contract has been audited by leading blockchain security firms to ensure its safety and reliability.",
    },
    FaqEntry {
        question: "Can I stake ADITI Tokens?",
        answer: "Yes, you can stake your ADITI Tokens to earn passive income. The staking rewards are distributed based on the amount and duration of your stake.",
    },
    FaqEntry {
        question: "What makes ADITI Token different from other cryptocurrencies?",
        answer: "ADITI Token stands out with its focus on community governance, low transaction fees, and innovative tokenomics. It's designed to be both user-friendly and sustainable in the long term.",
    },
];

/// Entries whose question or answer contains `query`, ignoring case.
/// An empty query matches everything.
pub fn search(query: &str) -> Vec<&'static FaqEntry> {
    let query = query.trim().to_lowercase();
    FAQ.iter()
        .filter(|e| {
            query.is_empty()
                || e.question.to_lowercase().contains(&query)
                || e.answer.to_lowercase().contains(&query)
        })
        .collect()
}
