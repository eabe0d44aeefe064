use alloy::sol;

// ERC-8004 Identity Registry contract interface
sol! {
    #[sol(rpc)]
    interface IIdentityRegistry {
        struct MetadataEntry {
            string key;
            string value;
        }

        // ERC-721 standard
        function ownerOf(uint256 tokenId) external view returns (address owner);
        function tokenURI(uint256 tokenId) external view returns (string memory uri);

        // Registration (overloads: bare, with URI, with URI + metadata)
        function register() external returns (uint256 agentId);
        function register(string calldata tokenURI) external returns (uint256 agentId);
        function register(string calldata tokenURI, MetadataEntry[] calldata metadata) external returns (uint256 agentId);

        function setAgentURI(uint256 agentId, string calldata newURI) external;

        // On-chain key/value metadata
        function getMetadata(uint256 agentId, string calldata key) external view returns (string memory value);
        function setMetadata(uint256 agentId, string calldata key, string calldata value) external;

        // Events
        event Registered(uint256 indexed agentId, string tokenURI, address indexed owner);
        event URIUpdated(uint256 indexed agentId, string newURI, address indexed updatedBy);
        event MetadataSet(uint256 indexed agentId, string indexed indexedKey, string key, string value);

        // Errors
        error ERC721NonexistentToken(uint256 tokenId);
    }
}

// ERC-8004 Reputation Registry contract interface
//
// Tags are bytes32 on-chain; the client converts to and from UTF-8 strings.
// Optional filters (client address, feedback index, tags) are expressed as
// zero values at the contract boundary.
sol! {
    #[sol(rpc)]
    interface IReputationRegistry {
        function giveFeedback(
            uint256 agentId,
            uint8 score,
            bytes32 tag1,
            bytes32 tag2,
            string calldata fileuri,
            bytes32 filehash,
            bytes calldata feedbackAuth
        ) external;

        function revokeFeedback(uint256 agentId, uint64 feedbackIndex) external;

        function appendResponse(
            uint256 agentId,
            address clientAddress,
            uint64 feedbackIndex,
            string calldata responseUri,
            bytes32 responseHash
        ) external;

        function getIdentityRegistry() external view returns (address registry);

        function getSummary(
            uint256 agentId,
            address[] calldata clientAddresses,
            bytes32 tag1,
            bytes32 tag2
        ) external view returns (uint64 count, uint8 averageScore);

        function readFeedback(
            uint256 agentId,
            address clientAddress,
            uint64 index
        ) external view returns (uint8 score, bytes32 tag1, bytes32 tag2, bool isRevoked);

        function readAllFeedback(
            uint256 agentId,
            address[] calldata clientAddresses,
            bytes32 tag1,
            bytes32 tag2,
            bool includeRevoked
        ) external view returns (
            address[] memory clients,
            uint8[] memory scores,
            bytes32[] memory tag1s,
            bytes32[] memory tag2s,
            bool[] memory revokedStatuses
        );

        function getClients(uint256 agentId) external view returns (address[] memory clients);

        function getLastIndex(uint256 agentId, address clientAddress) external view returns (uint64 lastIndex);

        function getResponseCount(
            uint256 agentId,
            address clientAddress,
            uint64 feedbackIndex,
            address[] calldata responders
        ) external view returns (uint64 count);

        // Events
        event NewFeedback(
            uint256 indexed agentId,
            address indexed clientAddress,
            uint64 feedbackIndex,
            uint8 score,
            bytes32 indexed indexedTag1,
            bytes32 tag1,
            bytes32 tag2,
            string fileuri,
            bytes32 filehash
        );

        event FeedbackRevoked(
            uint256 indexed agentId,
            address indexed clientAddress,
            uint64 feedbackIndex
        );

        event ResponseAppended(
            uint256 indexed agentId,
            address indexed clientAddress,
            uint64 feedbackIndex,
            address indexed responder,
            string responseUri
        );
    }
}
